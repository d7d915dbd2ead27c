//! Per-client connection gateway.
//!
//! One gateway runs per upgraded WebSocket. It:
//! - spawns a writer task that drains the client's outbound queue
//!   onto the socket,
//! - asks the router to replay the scene and register the client,
//! - forwards every decoded inbound frame to the router,
//! - asks the router to deregister the client when reading, decoding
//!   or writing fails.

use std::fmt;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use scene_protocol::{decode_message, encode_message, ProtocolError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::types::{ClientId, OutboundRx, RouterRequest, RouterTx};

/// Why a gateway stopped.
#[derive(Debug)]
enum Disconnect {
    /// Close frame or end of stream.
    Closed,
    /// Transport error while reading.
    ReadFailed(axum::Error),
    /// Frame that is not a valid message.
    DecodeFailed(ProtocolError),
    /// The writer task stopped (socket write failed).
    WriteFailed,
    /// The router loop is gone.
    RouterClosed,
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disconnect::Closed => f.write_str("closed by peer"),
            Disconnect::ReadFailed(e) => write!(f, "read error: {e}"),
            Disconnect::DecodeFailed(e) => write!(f, "decode error: {e}"),
            Disconnect::WriteFailed => f.write_str("write error"),
            Disconnect::RouterClosed => f.write_str("router closed"),
        }
    }
}

/// Run the full lifecycle of one client connection.
pub async fn run_client(
    client_id: ClientId,
    socket: WebSocket,
    router_tx: RouterTx,
) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let mut writer = tokio::spawn(run_writer(client_id, ws_sender, out_rx));

    let joined = router_tx
        .send(RouterRequest::Join {
            client_id,
            outbound: out_tx,
        })
        .is_ok();

    let reason = if joined {
        tokio::select! {
            reason = run_reader(client_id, &mut ws_receiver, &router_tx) => reason,
            _ = &mut writer => Disconnect::WriteFailed,
        }
    } else {
        Disconnect::RouterClosed
    };

    // Queued behind our Join, so the router sees them in that order.
    let _ = router_tx.send(RouterRequest::Leave { client_id });
    writer.abort();

    match reason {
        Disconnect::Closed => info!(%client_id, "client disconnected"),
        other => warn!(%client_id, reason = %other, "client dropped"),
    }
}

/// Forward inbound frames to the router until something goes wrong.
async fn run_reader(
    client_id: ClientId,
    ws_receiver: &mut SplitStream<WebSocket>,
    router_tx: &RouterTx,
) -> Disconnect {
    while let Some(frame) = ws_receiver.next().await {
        let decoded = match frame {
            Ok(WsMessage::Text(text)) => decode_message(text.as_str()),
            Ok(WsMessage::Binary(_)) => Err(ProtocolError::UnsupportedFrame("binary")),
            Ok(WsMessage::Close(_)) => return Disconnect::Closed,
            // Pings are answered by the WebSocket layer itself.
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => continue,
            Err(e) => return Disconnect::ReadFailed(e),
        };

        let msg = match decoded {
            Ok(msg) => msg,
            Err(e) => return Disconnect::DecodeFailed(e),
        };

        debug!(%client_id, kind = %msg.kind, handle = %msg.model_handle, "inbound message");
        if router_tx
            .send(RouterRequest::Inbound { client_id, msg })
            .is_err()
        {
            return Disconnect::RouterClosed;
        }
    }

    Disconnect::Closed
}

/// Drain the outbound queue onto the socket. Returns on the first
/// failed write or once every sender is gone.
async fn run_writer(
    client_id: ClientId,
    mut ws_sender: SplitSink<WebSocket, WsMessage>,
    mut out_rx: OutboundRx,
) {
    while let Some(msg) = out_rx.recv().await {
        let text = encode_message(&msg);
        if let Err(e) = ws_sender.send(WsMessage::Text(text.into())).await {
            warn!(%client_id, error = %e, "write failed");
            return;
        }
    }

    let _ = ws_sender.close().await;
}
