//! End-to-end tests using real WebSocket clients against a bound hub.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use scene_server::config::Config;
use scene_server::server::serve;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Boot a hub on an ephemeral port and return its address.
async fn boot_server(max_clients: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = Config {
        bind_addr: "127.0.0.1".into(),
        port: addr.port(),
        max_clients,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/public"),
    };

    let _server = tokio::spawn(async move {
        serve(listener, config, std::future::pending::<()>())
            .await
            .unwrap();
    });
    addr
}

async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

fn is_sync(value: &Value) -> bool {
    value["messageType"] == 0
        && value["stringData"]
            .as_str()
            .is_some_and(|s| s.starts_with("sync:"))
}

/// Next text frame as JSON, skipping other clients' sync markers.
async fn recv_json(ws: &mut WsStream) -> Value {
    loop {
        let frame = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("websocket error");
        match frame {
            Message::Text(text) => {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if !is_sync(&value) {
                    return value;
                }
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Connect and wait until the hub has registered this client.
///
/// Sends a pass-through marker and collects everything received before
/// it comes back, i.e. the join-time replay.
async fn connect(addr: SocketAddr, tag: &str) -> (WsStream, Vec<Value>) {
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let marker = format!("sync:{tag}");
    send_json(&mut ws, json!({ "messageType": 0, "stringData": marker })).await;

    let mut replay = Vec::new();
    loop {
        let frame = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for sync")
            .expect("stream ended")
            .expect("websocket error");
        let Message::Text(text) = frame else { continue };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        if value["stringData"] == marker.as_str() {
            break;
        }
        if !is_sync(&value) {
            replay.push(value);
        }
    }
    (ws, replay)
}

#[tokio::test]
async fn creates_are_renamed_and_broadcast_to_everyone() {
    let addr = boot_server(8).await;
    let (mut a, _) = connect(addr, "a").await;
    let (mut b, _) = connect(addr, "b").await;

    send_json(&mut a, json!({ "messageType": 1, "modelHandle": "sphere", "stringData": "r=1" })).await;
    send_json(&mut a, json!({ "messageType": 1, "modelHandle": "cube" })).await;

    for ws in [&mut a, &mut b] {
        let first = recv_json(ws).await;
        let second = recv_json(ws).await;
        assert_eq!(first["modelHandle"], "0 - sphere");
        assert_eq!(first["stringData"], "r=1");
        assert_eq!(second["modelHandle"], "1 - cube");
    }
}

#[tokio::test]
async fn late_joiner_gets_create_then_position_only() {
    let addr = boot_server(8).await;
    let (mut a, replay) = connect(addr, "a").await;
    assert!(replay.is_empty());

    send_json(&mut a, json!({ "messageType": 1, "modelHandle": "cube" })).await;
    assert_eq!(recv_json(&mut a).await["modelHandle"], "0 - cube");
    send_json(
        &mut a,
        json!({ "messageType": 3, "modelHandle": "0 - cube", "floatArrayData": [1.0, 2.0, 3.0] }),
    )
    .await;
    assert_eq!(recv_json(&mut a).await["messageType"], 3);

    let (_b, replay) = connect(addr, "b").await;
    assert_eq!(replay.len(), 2);
    assert_eq!(replay[0]["messageType"], 1);
    assert_eq!(replay[0]["modelHandle"], "0 - cube");
    assert_eq!(replay[1]["messageType"], 3);
    assert_eq!(replay[1]["floatArrayData"], json!([1.0, 2.0, 3.0]));
}

#[tokio::test]
async fn unknown_message_type_is_relayed_verbatim() {
    let addr = boot_server(8).await;
    let (mut a, _) = connect(addr, "a").await;
    let (mut b, _) = connect(addr, "b").await;

    let custom = json!({
        "messageType": 42,
        "modelHandle": "whatever",
        "floatArrayData": [1.5, -2.0],
        "stringData": "hello"
    });
    send_json(&mut a, custom.clone()).await;

    assert_eq!(recv_json(&mut b).await, custom);
    assert_eq!(recv_json(&mut a).await, custom);

    let (_c, replay) = connect(addr, "c").await;
    assert!(replay.is_empty());
}

#[tokio::test]
async fn malformed_frame_drops_only_the_sender() {
    let addr = boot_server(8).await;
    let (mut good, _) = connect(addr, "good").await;
    let (mut bad, _) = connect(addr, "bad").await;

    bad.send(Message::text("not json")).await.unwrap();

    let ended = timeout(TIMEOUT, async {
        loop {
            match bad.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "bad client was not disconnected");

    send_json(&mut good, json!({ "messageType": 1, "modelHandle": "cone" })).await;
    assert_eq!(recv_json(&mut good).await["modelHandle"], "0 - cone");
}

#[tokio::test]
async fn vanished_client_does_not_affect_others() {
    let addr = boot_server(8).await;
    let (mut a, _) = connect(addr, "a").await;
    let (gone, _) = connect(addr, "gone").await;
    drop(gone);

    send_json(&mut a, json!({ "messageType": 1, "modelHandle": "cube" })).await;
    send_json(&mut a, json!({ "messageType": 2, "modelHandle": "0 - cube" })).await;
    send_json(&mut a, json!({ "messageType": 1, "modelHandle": "torus" })).await;

    assert_eq!(recv_json(&mut a).await["modelHandle"], "0 - cube");
    assert_eq!(recv_json(&mut a).await["messageType"], 2);
    assert_eq!(recv_json(&mut a).await["modelHandle"], "0 - torus");
}

#[tokio::test]
async fn connections_over_limit_are_refused() {
    let addr = boot_server(1).await;
    let (_a, _) = connect(addr, "a").await;

    let second = connect_async(format!("ws://{addr}/ws")).await;
    assert!(second.is_err(), "second client should be refused");
}

#[tokio::test]
async fn quick_connect_close_cycles_do_not_exhaust_the_limit() {
    let addr = boot_server(1).await;

    for _ in 0..5 {
        let admitted = timeout(TIMEOUT, async {
            loop {
                match connect_async(format!("ws://{addr}/ws")).await {
                    Ok((mut ws, _)) => {
                        ws.close(None).await.unwrap();
                        return;
                    }
                    // The previous gateway may still be winding down.
                    Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
                }
            }
        })
        .await;
        assert!(admitted.is_ok(), "slot was never released");
    }

    let (_ws, replay) = connect(addr, "last").await;
    assert!(replay.is_empty());
}

#[tokio::test]
async fn static_files_are_served_outside_ws_route() {
    let addr = boot_server(8).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = Vec::new();
    timeout(TIMEOUT, stream.read_to_end(&mut response))
        .await
        .expect("timed out reading response")
        .unwrap();
    let response = String::from_utf8_lossy(&response);

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("scene hub test page"));
}
