//! In-memory WebSocket pairs and frame helpers shared by the unit tests.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

use crate::connection::ConnectionConfig;
use crate::envelope::Envelope;
use crate::protocol::Message;

pub(crate) const WAIT: Duration = Duration::from_secs(2);

/// Server and client ends of a WebSocket over an in-memory pipe.
pub(crate) async fn ws_pair() -> (WebSocketStream<DuplexStream>, WebSocketStream<DuplexStream>) {
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
    let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
    (server, client)
}

/// Settings that keep keepalive traffic out of the way of assertions.
pub(crate) fn quiet_connection_config() -> ConnectionConfig {
    ConnectionConfig {
        outbound_capacity: 16,
        ping_interval: Duration::from_secs(30),
        read_timeout: Duration::from_secs(60),
        write_timeout: Duration::from_secs(5),
        max_message_size: 1024,
    }
}

/// Next frame seen by the client, skipping keepalive traffic.
pub(crate) async fn next_frame(client: &mut WebSocketStream<DuplexStream>) -> Option<WsMessage> {
    loop {
        let frame = tokio::time::timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for frame")?
            .ok()?;
        match frame {
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => return Some(other),
        }
    }
}

/// Next binary frame seen by the client, decoded.
pub(crate) async fn next_message(client: &mut WebSocketStream<DuplexStream>) -> Message {
    match next_frame(client).await {
        Some(WsMessage::Binary(data)) => Message::decode(&data).expect("undecodable frame"),
        other => panic!("expected binary frame, got {other:?}"),
    }
}

/// Next envelope from an outbound queue.
pub(crate) async fn next_envelope(rx: &mut mpsc::Receiver<Envelope>) -> Envelope {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for envelope")
        .expect("outbound queue closed")
}
