//! Full configuration validation.
//!
//! Collects every range violation into a single `ConfigError`.

mod helpers;


use crate::schema::SlidecastConfig;
use slidecast_common::ConfigError;

use helpers::{validate_range, validate_range_u64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &SlidecastConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_hub(&mut errors, config);
    validate_connection(&mut errors, config);
    validate_audit(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &SlidecastConfig) {
    if config.server.port == 0 {
        errors.push("server.port must not be 0".into());
    }
    if config.server.bind_address.trim().is_empty() {
        errors.push("server.bind_address must not be empty".into());
    }
}

fn validate_hub(errors: &mut Vec<String>, config: &SlidecastConfig) {
    validate_range(
        errors,
        "hub.comment_buffer",
        config.hub.comment_buffer,
        1,
        10_000,
    );
    // Close frame reasons are limited to 123 bytes by RFC 6455.
    if config.hub.shutdown_reason.len() > 123 {
        errors.push("hub.shutdown_reason is longer than 123 bytes".into());
    }
}

fn validate_connection(errors: &mut Vec<String>, config: &SlidecastConfig) {
    let conn = &config.connection;
    validate_range(
        errors,
        "connection.outbound_capacity",
        conn.outbound_capacity,
        1,
        65_536,
    );
    validate_range(
        errors,
        "connection.max_message_size",
        conn.max_message_size,
        64,
        1_048_576,
    );
    validate_range_u64(
        errors,
        "connection.write_timeout_secs",
        conn.write_timeout_secs,
        1,
        300,
    );
    validate_range_u64(
        errors,
        "connection.read_timeout_secs",
        conn.read_timeout_secs,
        2,
        3_600,
    );
    if conn.ping_interval_secs == 0 || conn.ping_interval_secs >= conn.read_timeout_secs {
        errors.push(format!(
            "connection.ping_interval_secs = {} must be in [1, read_timeout_secs)",
            conn.ping_interval_secs
        ));
    }
}

fn validate_audit(errors: &mut Vec<String>, config: &SlidecastConfig) {
    if config.audit.enabled && config.audit.path.trim().is_empty() {
        errors.push("audit.path must be set when audit.enabled = true".into());
    }
}
