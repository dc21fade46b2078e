//! The broadcast hub.
//!
//! [`Hub`] is a cheap, cloneable handle. All registry mutation and every
//! broadcast happen on one event-loop task that waits on four sources:
//! registrations, inbound viewer frames, the external comment source, and
//! publication commands. Order is FIFO within a source; nothing is promised
//! across sources.

mod event_loop;


use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{Sink, Stream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::audit::MessageLogger;
use crate::connection::{Connection, ConnectionConfig};
use crate::envelope::Envelope;
use crate::error::StreamerError;
use crate::protocol::{Message, State};

use event_loop::EventLoop;

/// Hub settings.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Close a viewer after this many consecutive `BufferFull` pushes; 0 never does.
    pub drop_after_overflows: u32,
    /// Reason carried by the close frame sent to viewers when the hub stops.
    pub shutdown_reason: String,
    pub connection: ConnectionConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            drop_after_overflows: 0,
            shutdown_reason: "Server is stopping...".into(),
            connection: ConnectionConfig::default(),
        }
    }
}

pub(crate) enum RegistryEvent {
    Register(Arc<Connection>),
    Unregister(Arc<Connection>),
}

pub(crate) enum HubCommand {
    PublishState(State),
    PublishComment(String),
}

/// State read outside the event loop.
pub(crate) struct HubShared {
    /// Written only by the closure path.
    active: RwLock<bool>,
    /// Mirror of the registry size, maintained by the event loop.
    clients: AtomicUsize,
    presentation_id: AtomicU32,
    shutdown: CancellationToken,
    stopped: CancellationToken,
}

#[derive(Clone)]
pub struct Hub {
    shared: Arc<HubShared>,
    config: Arc<HubConfig>,
    registry_tx: mpsc::UnboundedSender<RegistryEvent>,
    inbound_tx: mpsc::UnboundedSender<Envelope>,
    command_tx: mpsc::UnboundedSender<HubCommand>,
}

impl Hub {
    /// Allocate the queues and launch the event loop.
    ///
    /// `comments` is the external comment source; the hub only reads it.
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: HubConfig,
        logger: Arc<dyn MessageLogger>,
        comments: mpsc::Receiver<String>,
    ) -> Self {
        let (registry_tx, registry_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(HubShared {
            active: RwLock::new(true),
            clients: AtomicUsize::new(0),
            presentation_id: AtomicU32::new(0),
            shutdown: CancellationToken::new(),
            stopped: CancellationToken::new(),
        });
        let config = Arc::new(config);

        let event_loop = EventLoop::new(
            Arc::clone(&shared),
            Arc::clone(&config),
            logger,
            registry_rx,
            inbound_rx,
            comments,
            command_rx,
        );
        tokio::spawn(event_loop.run());

        Self {
            shared,
            config,
            registry_tx,
            inbound_tx,
            command_tx,
        }
    }

    /// Serve one viewer until its session ends.
    ///
    /// The snapshot is queued before the connection is registered, so it is
    /// always the first frame the viewer sees. Returns once both workers have
    /// terminated and the unregistration has been submitted. Only failures to
    /// encode or queue the snapshot, or a stopped hub, are returned; later
    /// transport failures end the session and are logged.
    pub async fn accept<S>(&self, transport: S, initial_state: &State) -> Result<(), StreamerError>
    where
        S: Stream<Item = Result<WsMessage, WsError>>
            + Sink<WsMessage, Error = WsError>
            + Send
            + Unpin
            + 'static,
    {
        let (conn, outbound) = Connection::new(self.config.connection.outbound_capacity);
        self.admit(&conn, initial_state).await?;

        let workers = conn.spawn_workers(
            transport,
            outbound,
            self.inbound_tx.downgrade(),
            &self.config.connection,
        );
        workers.join().await;

        conn.close().await;
        self.unregister(conn);
        Ok(())
    }

    /// Fan a new presentation state out to every viewer, addressed to each.
    pub fn publish_state(&self, state: State) {
        if self.command_tx.send(HubCommand::PublishState(state)).is_err() {
            debug!("hub stopped, state not published");
        }
    }

    /// Relay a comment to every viewer under the nil identity.
    pub fn publish_comment(&self, text: impl Into<String>) {
        if self
            .command_tx
            .send(HubCommand::PublishComment(text.into()))
            .is_err()
        {
            debug!("hub stopped, comment not published");
        }
    }

    /// Number of registered viewers.
    pub fn clients_count(&self) -> usize {
        self.shared.clients.load(Ordering::Relaxed)
    }

    /// Presentation id of the last state the event loop broadcast.
    pub fn current_presentation_id(&self) -> u32 {
        self.shared.presentation_id.load(Ordering::Relaxed)
    }

    pub async fn is_closed(&self) -> bool {
        !*self.shared.active.read().await
    }

    /// Ask the event loop to stop. Viewers get a close notification and the
    /// registry is cleared.
    pub fn shutdown(&self) {
        self.shared.shutdown.cancel();
    }

    /// Resolves once the event loop has run its closure path.
    pub async fn stopped(&self) {
        self.shared.stopped.cancelled().await;
    }

    /// Queue the snapshot addressed to `conn`, then register it.
    pub(crate) async fn admit(
        &self,
        conn: &Arc<Connection>,
        initial_state: &State,
    ) -> Result<(), StreamerError> {
        let snapshot = Envelope::encode(conn.user_id(), &Message::State(initial_state.clone()))?;
        conn.push_message(snapshot).await?;
        self.register(Arc::clone(conn))
    }

    pub(crate) fn register(&self, conn: Arc<Connection>) -> Result<(), StreamerError> {
        self.registry_tx
            .send(RegistryEvent::Register(conn))
            .map_err(|_| StreamerError::HubClosed)
    }

    pub(crate) fn unregister(&self, conn: Arc<Connection>) {
        if self
            .registry_tx
            .send(RegistryEvent::Unregister(conn))
            .is_err()
        {
            debug!("hub stopped before unregistration");
        }
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("clients", &self.clients_count())
            .field("presentation_id", &self.current_presentation_id())
            .finish()
    }
}
