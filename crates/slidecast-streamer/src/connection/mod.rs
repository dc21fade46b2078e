//! One viewer's duplex session.
//!
//! A connection is Open after construction, Closing from the moment either
//! worker exits or [`Connection::close`] runs, and Closed once both workers
//! have joined. Only then does the hub unregister it.

mod workers;


use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, Stream, StreamExt};
use slidecast_common::{new_session_key, UserId};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::envelope::Envelope;
use crate::error::StreamerError;

/// Per-connection transport settings.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Capacity of the outbound queue.
    pub outbound_capacity: usize,
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
    /// Silence (pongs included) tolerated before the peer is considered gone.
    pub read_timeout: Duration,
    /// Upper bound on a single frame write.
    pub write_timeout: Duration,
    /// Inbound frames above this size close the connection.
    pub max_message_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 256,
            ping_interval: Duration::from_secs(54),
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
            max_message_size: 1024,
        }
    }
}

pub struct Connection {
    key: String,
    user_id: UserId,
    sender: mpsc::Sender<Envelope>,
    alive: RwLock<bool>,
    cancel: CancellationToken,
    overflows: AtomicU32,
}

impl Connection {
    /// Create an Open connection with a fresh key and identity.
    ///
    /// Returns the receiving half of the outbound queue, which the outbound
    /// worker drains.
    pub fn new(outbound_capacity: usize) -> (Arc<Self>, mpsc::Receiver<Envelope>) {
        let (sender, receiver) = mpsc::channel(outbound_capacity.max(1));
        let conn = Self {
            key: new_session_key(),
            user_id: UserId::new(),
            sender,
            alive: RwLock::new(true),
            cancel: CancellationToken::new(),
            overflows: AtomicU32::new(0),
        };
        (Arc::new(conn), receiver)
    }

    /// Registry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Enqueue a frame without waiting.
    ///
    /// A full queue drops the frame and returns `BufferFull`; the connection
    /// itself stays open.
    pub async fn push_message(&self, envelope: Envelope) -> Result<(), StreamerError> {
        let alive = self.alive.read().await;
        if !*alive {
            return Err(StreamerError::AlreadyClosed);
        }
        match self.sender.try_send(envelope) {
            Ok(()) => {
                self.overflows.store(0, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.overflows.fetch_add(1, Ordering::Relaxed);
                Err(StreamerError::BufferFull)
            }
            Err(TrySendError::Closed(_)) => Err(StreamerError::AlreadyClosed),
        }
    }

    /// Number of `BufferFull` results since the last successful push.
    pub fn consecutive_overflows(&self) -> u32 {
        self.overflows.load(Ordering::Relaxed)
    }

    pub async fn is_closed(&self) -> bool {
        !*self.alive.read().await
    }

    /// Move the connection to Closing and signal both workers to unwind.
    ///
    /// Idempotent: returns `true` for the call that performed the transition
    /// and `false` for every later call. The outbound worker flushes what is
    /// already queued and then closes the transport.
    pub async fn close(&self) -> bool {
        let mut alive = self.alive.write().await;
        if !*alive {
            return false;
        }
        *alive = false;
        self.cancel.cancel();
        true
    }

    /// Launch the inbound and outbound workers over `transport`.
    ///
    /// Inbound frames go to `inbound`, a weak handle on the hub's aggregation
    /// queue; the connection never keeps that queue alive on its own.
    pub(crate) fn spawn_workers<S>(
        self: &Arc<Self>,
        transport: S,
        outbound: mpsc::Receiver<Envelope>,
        inbound: mpsc::WeakUnboundedSender<Envelope>,
        config: &ConnectionConfig,
    ) -> Workers
    where
        S: Stream<Item = Result<WsMessage, WsError>>
            + Sink<WsMessage, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        let (sink, stream) = transport.split();
        let outbound = tokio::spawn(workers::write_loop(
            Arc::clone(self),
            sink,
            outbound,
            config.clone(),
        ));
        let inbound = tokio::spawn(workers::read_loop(
            Arc::clone(self),
            stream,
            inbound,
            config.clone(),
        ));
        Workers { outbound, inbound }
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("key", &self.key)
            .field("user_id", &self.user_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Join handles for a connection's two workers.
pub(crate) struct Workers {
    outbound: JoinHandle<()>,
    inbound: JoinHandle<()>,
}

impl Workers {
    /// Wait until both workers have terminated.
    pub(crate) async fn join(self) {
        let (outbound, inbound) = tokio::join!(self.outbound, self.inbound);
        if let Err(e) = outbound {
            warn!(error = %e, "outbound worker panicked");
        }
        if let Err(e) = inbound {
            warn!(error = %e, "inbound worker panicked");
        }
    }
}
