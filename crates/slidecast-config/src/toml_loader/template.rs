//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Slidecast Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind_address = "0.0.0.0"
port = 8080

[hub]
# comment_buffer = 10          # 1-10000
# drop_after_overflows = 0     # 0 = never drop slow viewers
# shutdown_reason = "Server is stopping..."

[connection]
# outbound_capacity = 256      # 1-65536
# ping_interval_secs = 54      # must be below read_timeout_secs
# read_timeout_secs = 60
# write_timeout_secs = 10      # 1-300
# max_message_size = 1024      # bytes, 64-1048576

[audit]
# enabled = false
# path = "slidecast-audit.jsonl"

[logging]
# level = "info"               # trace, debug, info, warn, error
"##
}
