//! Presenter console on stdin.
//!
//! ```text
//! state <id> [slide]   switch presentation
//! next                 advance one slide
//! stage <name>         paused | speaking | reviewing
//! comment <text>       inject a comment as if from the comment source
//! count                print the number of connected viewers
//! ```

use std::sync::Arc;

use slidecast_streamer::{Hub, Stage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::controller::PresentationController;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    State { presentation_id: u32, slide: u32 },
    Next,
    Stage(Stage),
    Comment(String),
    Count,
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "state" => {
            let mut parts = rest.split_whitespace();
            let presentation_id = parts
                .next()
                .ok_or("usage: state <id> [slide]")?
                .parse::<u32>()
                .map_err(|e| format!("invalid presentation id: {e}"))?;
            let slide = match parts.next() {
                Some(slide) => slide
                    .parse::<u32>()
                    .map_err(|e| format!("invalid slide: {e}"))?,
                None => 0,
            };
            Command::State {
                presentation_id,
                slide,
            }
        }
        "next" => Command::Next,
        "stage" => Command::Stage(rest.parse()?),
        "comment" if !rest.is_empty() => Command::Comment(rest.to_owned()),
        "comment" => return Err("usage: comment <text>".into()),
        "count" => Command::Count,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

/// Read commands from stdin until EOF.
pub async fn run(
    controller: Arc<PresentationController>,
    hub: Hub,
    comments: mpsc::Sender<String>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read console input");
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(command)) => execute(command, &controller, &hub, &comments).await,
            Ok(None) => {}
            Err(e) => warn!("{e}"),
        }
    }
    info!("console closed");
}

async fn execute(
    command: Command,
    controller: &PresentationController,
    hub: &Hub,
    comments: &mpsc::Sender<String>,
) {
    match command {
        Command::State {
            presentation_id,
            slide,
        } => {
            controller.set_state(presentation_id, slide).await;
        }
        Command::Next => {
            controller.next_slide().await;
        }
        Command::Stage(stage) => {
            controller.set_stage(stage).await;
        }
        Command::Comment(text) => {
            if comments.send(text).await.is_err() {
                warn!("hub no longer reads comments");
            }
        }
        Command::Count => info!(viewers = hub.clients_count(), "connected viewers"),
    }
}
