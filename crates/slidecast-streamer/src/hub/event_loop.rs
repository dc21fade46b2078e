//! The hub's single worker: sole owner of the registry and sole broadcaster.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use slidecast_common::UserId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{HubCommand, HubConfig, HubShared, RegistryEvent};
use crate::audit::MessageLogger;
use crate::connection::Connection;
use crate::envelope::{Envelope, CLOSE_SERVICE_RESTART};
use crate::error::StreamerError;
use crate::protocol::{Comment, Message, State, Viewer};

pub(super) struct EventLoop {
    shared: Arc<HubShared>,
    config: Arc<HubConfig>,
    logger: Arc<dyn MessageLogger>,
    clients: HashMap<String, Arc<Connection>>,
    registry_rx: mpsc::UnboundedReceiver<RegistryEvent>,
    inbound_rx: mpsc::UnboundedReceiver<Envelope>,
    comments: Option<mpsc::Receiver<String>>,
    command_rx: mpsc::UnboundedReceiver<HubCommand>,
}

impl EventLoop {
    pub(super) fn new(
        shared: Arc<HubShared>,
        config: Arc<HubConfig>,
        logger: Arc<dyn MessageLogger>,
        registry_rx: mpsc::UnboundedReceiver<RegistryEvent>,
        inbound_rx: mpsc::UnboundedReceiver<Envelope>,
        comments: mpsc::Receiver<String>,
        command_rx: mpsc::UnboundedReceiver<HubCommand>,
    ) -> Self {
        Self {
            shared,
            config,
            logger,
            clients: HashMap::new(),
            registry_rx,
            inbound_rx,
            comments: Some(comments),
            command_rx,
        }
    }

    pub(super) async fn run(mut self) {
        let shutdown = self.shared.shutdown.clone();
        info!("hub started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("hub shutdown requested");
                    break;
                }
                event = self.registry_rx.recv() => match event {
                    Some(event) => self.handle_registry(event).await,
                    None => break,
                },
                envelope = self.inbound_rx.recv() => match envelope {
                    Some(envelope) => self.ingest_client_message(envelope).await,
                    None => break,
                },
                comment = next_comment(&mut self.comments) => match comment {
                    Some(text) => self.relay_comment(text).await,
                    None => {
                        info!("comment source closed");
                        self.comments = None;
                    }
                },
                command = self.command_rx.recv() => match command {
                    Some(HubCommand::PublishState(state)) => self.publish_state(state).await,
                    Some(HubCommand::PublishComment(text)) => self.relay_comment(text).await,
                    None => break,
                },
            }
        }

        self.close().await;
    }

    async fn handle_registry(&mut self, event: RegistryEvent) {
        let user_id = match event {
            RegistryEvent::Register(conn) => {
                let user_id = conn.user_id();
                info!(key = %conn.key(), user_id = %user_id, "viewer connected");
                self.clients.insert(conn.key().to_owned(), conn);
                user_id
            }
            RegistryEvent::Unregister(conn) => {
                if self.clients.remove(conn.key()).is_none() {
                    return;
                }
                info!(key = %conn.key(), user_id = %conn.user_id(), "viewer disconnected");
                conn.user_id()
            }
        };

        let count = self.clients.len();
        self.shared.clients.store(count, Ordering::Relaxed);

        let message = Message::Viewer(Viewer {
            count: u32::try_from(count).unwrap_or(u32::MAX),
        });
        match Envelope::encode(user_id, &message) {
            Ok(envelope) => self.broadcast_envelope(envelope).await,
            Err(e) => warn!(error = %e, "failed to encode viewer count"),
        }
    }

    /// Persist a viewer's frame, then echo it unchanged to every viewer,
    /// the sender included.
    async fn ingest_client_message(&mut self, envelope: Envelope) {
        if let Err(e) = self.logger.log_message(&envelope).await {
            warn!(user_id = %envelope.user_id, error = %e, "failed to persist client message");
        }
        self.broadcast_envelope(envelope).await;
    }

    async fn relay_comment(&mut self, text: String) {
        let message = Message::Comment(Comment {
            presentation_id: self.shared.presentation_id.load(Ordering::Relaxed),
            text,
        });
        match Envelope::encode(UserId::NIL, &message) {
            Ok(envelope) => self.broadcast_envelope(envelope).await,
            Err(e) => warn!(error = %e, "failed to encode comment"),
        }
    }

    /// Encode once, then address one copy to each viewer.
    ///
    /// The presentation id mirror moves with the broadcast, so comments
    /// relayed before this point keep the previous id.
    async fn publish_state(&mut self, state: State) {
        self.shared
            .presentation_id
            .store(state.presentation_id, Ordering::Relaxed);
        let payload = match Message::State(state).encode() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to encode state");
                return;
            }
        };
        for conn in self.clients.values() {
            let envelope = Envelope::binary(conn.user_id(), payload.clone());
            self.deliver(conn, envelope).await;
        }
        debug!(recipients = self.clients.len(), "state published");
    }

    async fn broadcast_envelope(&self, envelope: Envelope) {
        for conn in self.clients.values() {
            self.deliver(conn, envelope.clone()).await;
        }
    }

    /// Push one frame; failures stay with that connection.
    async fn deliver(&self, conn: &Connection, envelope: Envelope) {
        match conn.push_message(envelope).await {
            Ok(()) => {}
            Err(StreamerError::BufferFull) => {
                let overflows = conn.consecutive_overflows();
                let limit = self.config.drop_after_overflows;
                if limit > 0 && overflows >= limit {
                    warn!(key = %conn.key(), overflows, "dropping slow viewer");
                    conn.close().await;
                } else {
                    warn!(key = %conn.key(), overflows, "outbound buffer full, frame dropped");
                }
            }
            Err(e) => warn!(key = %conn.key(), error = %e, "failed to push message"),
        }
    }

    /// Closure path: notify and close every viewer, then mark the hub inactive.
    async fn close(&mut self) {
        let mut active = self.shared.active.write().await;

        let notice = Envelope::close(CLOSE_SERVICE_RESTART, self.config.shutdown_reason.clone());
        for (_, conn) in self.clients.drain() {
            if let Err(e) = conn.push_message(notice.clone()).await {
                warn!(key = %conn.key(), error = %e, "failed to send close notice");
            }
            conn.close().await;
        }

        // Registrations that raced the shutdown are closed rather than leaked.
        self.registry_rx.close();
        while let Ok(event) = self.registry_rx.try_recv() {
            if let RegistryEvent::Register(conn) = event {
                conn.close().await;
            }
        }

        self.shared.clients.store(0, Ordering::Relaxed);
        *active = false;
        drop(active);

        self.shared.stopped.cancel();
        info!("hub stopped");
    }
}

async fn next_comment(source: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match source {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
