//! Interactive WebSocket client for poking at a running scene hub.
//!
//!   cargo run -p scene-server --example ws_client
//!
//! Every frame pushed by the hub is printed as `<< {json}`.

use std::env;
use std::error::Error;

use futures_util::{SinkExt, StreamExt};
use scene_core::{Message, MessageKind};
use scene_protocol::{decode_message, encode_message};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Where to connect: env override or default.
    let url = env::var("SCENE_CLIENT_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string());

    println!("Connecting to {}...", url);
    let (ws, _) = connect_async(url.as_str()).await?;
    println!("Connected.");
    println!("Type commands like:");
    println!("  create cube [string data]");
    println!("  move 0 - cube 1 2 3");
    println!("  rotate 0 - cube 0 1.57 0");
    println!("  scale 0 - cube 2 2 2");
    println!("  remove 0 - cube");
    println!("  raw {{\"messageType\":9,\"stringData\":\"hi\"}}");
    println!("Type 'quit' or 'exit' to leave.\n");

    let (mut sink, mut stream) = ws.split();

    // Print everything the hub sends, replay included.
    let printer = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => match decode_message(text.as_str()) {
                    Ok(msg) => println!("<< [{}] {}", msg.kind, text.as_str()),
                    Err(_) => println!("<< {}", text.as_str()),
                },
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Read error: {}", e);
                    break;
                }
            }
        }
        println!("Connection closed by hub.");
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting client.");
            break;
        }

        let text = if let Some(raw) = trimmed.strip_prefix("raw ") {
            raw.to_string()
        } else {
            match parse_command(trimmed) {
                Some(msg) => encode_message(&msg),
                None => {
                    eprintln!("Could not parse command. Check the format above.");
                    continue;
                }
            }
        };

        println!(">> {}", text);
        if let Err(e) = sink.send(WsMessage::text(text)).await {
            eprintln!("Write error: {}", e);
            break;
        }
    }

    let _ = sink.close().await;
    printer.abort();
    Ok(())
}

/// Parse one command line into a message.
///
/// Handles contain spaces (`"0 - cube"`), so transform commands take
/// their numbers from the end of the line and the handle is whatever
/// is left in between.
fn parse_command(line: &str) -> Option<Message> {
    let (verb, rest) = line.split_once(' ')?;
    let rest = rest.trim();

    let kind = match verb.to_ascii_lowercase().as_str() {
        "create" => {
            let (geometry, data) = rest.split_once(' ').unwrap_or((rest, ""));
            return Some(Message::create(geometry, data.trim()));
        }
        "remove" => return Some(Message::remove(rest)),
        "move" => MessageKind::Move,
        "rotate" => MessageKind::Rotate,
        "scale" => MessageKind::Scale,
        _ => return None,
    };

    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let mut data = Vec::new();
    while let Some(value) = tokens.last().and_then(|t| t.parse::<f64>().ok()) {
        data.insert(0, value);
        tokens.pop();
    }
    if tokens.is_empty() || data.is_empty() {
        return None;
    }

    Some(Message::new(kind, tokens.join(" "), data))
}
