//! Translation of the file config into runtime settings.

use std::time::Duration;

use slidecast_config::SlidecastConfig;
use slidecast_streamer::{ConnectionConfig, HubConfig};

pub fn hub_config(config: &SlidecastConfig) -> HubConfig {
    let conn = &config.connection;
    HubConfig {
        drop_after_overflows: config.hub.drop_after_overflows,
        shutdown_reason: config.hub.shutdown_reason.clone(),
        connection: ConnectionConfig {
            outbound_capacity: conn.outbound_capacity,
            ping_interval: Duration::from_secs(conn.ping_interval_secs),
            read_timeout: Duration::from_secs(conn.read_timeout_secs),
            write_timeout: Duration::from_secs(conn.write_timeout_secs),
            max_message_size: conn.max_message_size,
        },
    }
}

/// Log filter directive: CLI override first, then the config file.
pub fn log_directive(cli_level: Option<&str>, config: &SlidecastConfig) -> String {
    let level = cli_level.unwrap_or_else(|| config.logging.level.as_directive());
    format!("slidecast_server={level},slidecast_streamer={level},slidecast_config={level}")
}
