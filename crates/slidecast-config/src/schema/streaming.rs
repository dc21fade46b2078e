//! Hub and per-connection tuning.

use serde::{Deserialize, Serialize};

/// Broadcast hub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Capacity of the queue feeding external comments into the hub.
    pub comment_buffer: usize,
    /// Close a connection after this many consecutive full-buffer pushes.
    /// 0 keeps slow connections registered forever.
    pub drop_after_overflows: u32,
    /// Reason sent in the close frame when the hub stops.
    pub shutdown_reason: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            comment_buffer: 10,
            drop_after_overflows: 0,
            shutdown_reason: "Server is stopping...".into(),
        }
    }
}

/// Per-connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Frames buffered per viewer before pushes fail with `BufferFull`.
    pub outbound_capacity: usize,
    pub ping_interval_secs: u64,
    /// A connection that sends nothing (pongs included) for this long is dropped.
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// Largest inbound frame in bytes.
    pub max_message_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 256,
            ping_interval_secs: 54,
            read_timeout_secs: 60,
            write_timeout_secs: 10,
            max_message_size: 1024,
        }
    }
}
