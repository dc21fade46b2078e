//! Broadcast hub for live presentation viewers.
//!
//! A single [`Hub`] event loop owns the registry of viewer [`Connection`]s and
//! is the only place frames are fanned out from. Each connection runs two
//! workers (inbound and outbound) that shuttle frames between its WebSocket
//! and the hub's queues without ever touching hub state.
//!
//! ```text
//!   comment source ─┐
//!   publish_*()  ───┼──► Hub event loop ──► Connection::push_message ──► outbound worker ──► WS
//!   inbound workers ┘        ▲                                                              │
//!                            └──────────── inbound aggregation queue ◄── inbound worker ◄───┘
//! ```

pub mod audit;
pub mod connection;
pub mod envelope;
pub mod error;
pub mod hub;
pub mod protocol;

pub use audit::{JsonlAuditLog, MessageLogger, NullLogger};
pub use connection::{Connection, ConnectionConfig};
pub use envelope::{Envelope, FrameKind, CLOSE_SERVICE_RESTART};
pub use error::{CodecError, StreamerError};
pub use hub::{Hub, HubConfig};
pub use protocol::{Comment, Message, Stage, State, Viewer};

#[cfg(test)]
pub(crate) mod testutil;
