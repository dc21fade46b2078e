use std::path::PathBuf;

use clap::Parser;

/// slidecast: live slide state and comments for presentation viewers.
#[derive(Parser, Debug)]
#[command(name = "slidecast-server", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on, overriding the config file.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_everything_to_config() {
        let args = Args::try_parse_from(["slidecast-server"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.port.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.print_config);
    }

    #[test]
    fn overrides_are_parsed() {
        let args = Args::try_parse_from([
            "slidecast-server",
            "--config",
            "/etc/slidecast.toml",
            "-p",
            "9000",
            "--log-level",
            "debug",
            "--print-config",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/slidecast.toml")));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.print_config);
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Args::try_parse_from(["slidecast-server", "--port", "70000"]).is_err());
    }
}
