//! Inbound and outbound workers. Each one marks the connection Closing on
//! exit, which cancels its sibling.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, warn};

use super::{Connection, ConnectionConfig};
use crate::envelope::Envelope;
use crate::error::StreamerError;

/// Drain the outbound queue to the transport and keep the peer alive.
pub(super) async fn write_loop<S>(
    conn: Arc<Connection>,
    mut sink: SplitSink<S, WsMessage>,
    mut outbound: mpsc::Receiver<Envelope>,
    config: ConnectionConfig,
) where
    S: Sink<WsMessage, Error = WsError>,
{
    // `interval` panics on a zero period.
    let period = config.ping_interval.max(Duration::from_millis(1));
    let mut keepalive = tokio::time::interval_at(Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Queued frames go out before cancellation is honored, so a close
            // notification pushed right before `close()` still reaches the peer.
            biased;

            frame = outbound.recv() => {
                let Some(envelope) = frame else { break };
                let closing = envelope.is_close();
                if let Err(e) = write_frame(&mut sink, envelope.to_ws_message(), config.write_timeout).await {
                    debug!(key = %conn.key(), error = %e, "write failed");
                    break;
                }
                if closing {
                    break;
                }
            }
            _ = conn.cancellation().cancelled() => break,
            _ = keepalive.tick() => {
                if let Err(e) = write_frame(&mut sink, WsMessage::Ping(Default::default()), config.write_timeout).await {
                    debug!(key = %conn.key(), error = %e, "keepalive failed");
                    break;
                }
            }
        }
    }

    if tokio::time::timeout(config.write_timeout, sink.close())
        .await
        .is_err()
    {
        debug!(key = %conn.key(), "transport close timed out");
    }
    conn.close().await;
    debug!(key = %conn.key(), "outbound worker stopped");
}

/// Forward binary frames from the transport into the hub's inbound queue.
pub(super) async fn read_loop<S>(
    conn: Arc<Connection>,
    mut stream: SplitStream<S>,
    inbound: mpsc::WeakUnboundedSender<Envelope>,
    config: ConnectionConfig,
) where
    S: Stream<Item = Result<WsMessage, WsError>>,
{
    loop {
        let frame = tokio::select! {
            _ = conn.cancellation().cancelled() => break,
            frame = tokio::time::timeout(config.read_timeout, stream.next()) => frame,
        };

        match frame {
            Err(_) => {
                debug!(key = %conn.key(), "read deadline exceeded");
                break;
            }
            Ok(None) | Ok(Some(Ok(WsMessage::Close(_)))) => {
                debug!(key = %conn.key(), "peer closed connection");
                break;
            }
            Ok(Some(Err(e))) => {
                debug!(key = %conn.key(), error = %e, "read failed");
                break;
            }
            Ok(Some(Ok(WsMessage::Binary(data)))) => {
                if data.len() > config.max_message_size {
                    warn!(
                        key = %conn.key(),
                        size = data.len(),
                        limit = config.max_message_size,
                        "inbound frame too large"
                    );
                    break;
                }
                let Some(hub) = inbound.upgrade() else {
                    debug!(key = %conn.key(), "hub inbound queue is gone");
                    break;
                };
                if hub.send(Envelope::binary(conn.user_id(), data)).is_err() {
                    break;
                }
            }
            Ok(Some(Ok(WsMessage::Text(_)))) => {
                debug!(key = %conn.key(), "ignoring text frame");
            }
            // Ping/pong are answered by tungstenite; they only reset the deadline.
            Ok(Some(Ok(_))) => {}
        }
    }

    conn.close().await;
    debug!(key = %conn.key(), "inbound worker stopped");
}

async fn write_frame<S>(sink: &mut S, frame: WsMessage, limit: Duration) -> Result<(), StreamerError>
where
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    match tokio::time::timeout(limit, sink.send(frame)).await {
        Ok(result) => result.map_err(StreamerError::from),
        Err(_) => Err(StreamerError::Transport(WsError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "write timed out",
        )))),
    }
}
