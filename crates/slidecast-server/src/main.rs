//! slidecast-server: WebSocket broadcast server for live presentations.
//!
//! Viewers connect over WebSocket, receive the current slide state, and from
//! then on get every state change, viewer count update, and comment. The
//! presenter drives the state from the stdin console.

mod cli;
mod console;
mod controller;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use slidecast_common::{Result, SlidecastError};
use slidecast_config::{config_to_json, SlidecastConfig};
use slidecast_streamer::{Hub, JsonlAuditLog, MessageLogger, NullLogger};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::controller::PresentationController;

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(e) = run(args).await {
        eprintln!("slidecast-server: {e}");
        std::process::exit(1);
    }
}

/// Cancel `token` on Ctrl-C or SIGTERM.
fn setup_shutdown_signal(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received Ctrl-C, shutting down"),
            _ = terminate => info!("received SIGTERM, shutting down"),
        }
        token.cancel();
    });
}

async fn run(args: cli::Args) -> Result<()> {
    // An explicit config path must load; the default location falls back.
    let (mut config, fallback) = match &args.config {
        Some(path) => (slidecast_config::load_config_from(path)?, None),
        None => match slidecast_config::load_config() {
            Ok(config) => (config, None),
            Err(e) => (SlidecastConfig::default(), Some(e)),
        },
    };
    if let Some(port) = args.port {
        config.server.port = port;
        slidecast_config::validation::validate(&config)?;
    }

    if args.print_config {
        println!("{}", config_to_json(&config));
        return Ok(());
    }

    let directive = settings::log_directive(args.log_level.as_deref(), &config);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.into()))
        .init();
    if let Some(e) = fallback {
        warn!(error = %e, "using default config");
    }

    let logger: Arc<dyn MessageLogger> = if config.audit.enabled {
        let audit = JsonlAuditLog::open(&config.audit.path).await?;
        info!(path = %audit.path().display(), "audit log enabled");
        Arc::new(audit)
    } else {
        Arc::new(NullLogger)
    };

    let (comments_tx, comments_rx) = mpsc::channel(config.hub.comment_buffer.max(1));
    let hub = Hub::start(settings::hub_config(&config), logger, comments_rx);
    let controller = Arc::new(PresentationController::new(hub.clone()));
    tokio::spawn(console::run(Arc::clone(&controller), hub.clone(), comments_tx));

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| SlidecastError::Network(format!("failed to bind {addr}: {e}")))?;
    info!("slidecast-server listening on {}", addr);

    let shutdown = CancellationToken::new();
    setup_shutdown_signal(shutdown.clone());
    let sessions = TaskTracker::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let hub = hub.clone();
                    let controller = Arc::clone(&controller);
                    sessions.spawn(async move {
                        let ws = match accept_async(stream).await {
                            Ok(ws) => ws,
                            Err(e) => {
                                warn!(peer = %peer, error = %e, "WS handshake failed");
                                return;
                            }
                        };
                        let snapshot = controller.snapshot().await;
                        if let Err(e) = hub.accept(ws, &snapshot).await {
                            warn!(peer = %peer, error = %e, "viewer session failed");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "TCP accept error"),
            },
        }
    }

    drop(listener);
    hub.shutdown();
    hub.stopped().await;

    // Sessions unwind within one write timeout once the hub has closed them.
    sessions.close();
    let grace = Duration::from_secs(config.connection.write_timeout_secs + 1);
    if tokio::time::timeout(grace, sessions.wait()).await.is_err() {
        warn!(remaining = sessions.len(), "viewer sessions still open at exit");
    }
    info!("slidecast-server stopped");
    Ok(())
}
