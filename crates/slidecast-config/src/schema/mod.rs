//! Configuration schema types for the slidecast server.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod server;
mod streaming;
mod system;

pub use server::*;
pub use streaming::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SlidecastConfig {
    pub server: ServerConfig,
    pub hub: HubConfig,
    pub connection: ConnectionConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}
