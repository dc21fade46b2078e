//! Persistence of inbound viewer messages.
//!
//! The hub hands every frame it receives from a viewer to a [`MessageLogger`]
//! before broadcasting it. Logger failures are reported to the hub, which
//! logs them and broadcasts anyway.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use slidecast_common::UserId;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::envelope::Envelope;
use crate::error::StreamerError;
use crate::protocol::Message;

#[async_trait]
pub trait MessageLogger: Send + Sync {
    /// Record one inbound viewer frame.
    async fn log_message(&self, envelope: &Envelope) -> Result<(), StreamerError>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

#[async_trait]
impl MessageLogger for NullLogger {
    async fn log_message(&self, _envelope: &Envelope) -> Result<(), StreamerError> {
        Ok(())
    }
}

/// One line of the audit file.
#[derive(Debug, Serialize)]
struct AuditRecord<'a> {
    received_at: String,
    user_id: UserId,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    presentation_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    size: usize,
}

/// Appends one JSON object per inbound message to a file.
pub struct JsonlAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditLog {
    /// Open (or create) `path` for appending.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MessageLogger for JsonlAuditLog {
    async fn log_message(&self, envelope: &Envelope) -> Result<(), StreamerError> {
        let message = envelope
            .decode()
            .map_err(|e| StreamerError::Persistence(format!("undecodable payload: {e}")))?;

        let text = match &message {
            Message::Comment(comment) => Some(comment.text.as_str()),
            Message::State(state) if !state.info.is_empty() => Some(state.info.as_str()),
            _ => None,
        };
        let record = AuditRecord {
            received_at: chrono::Utc::now().to_rfc3339(),
            user_id: envelope.user_id,
            kind: message.kind(),
            presentation_id: message.presentation_id(),
            text,
            size: envelope.payload.len(),
        };

        let mut line = serde_json::to_vec(&record)
            .map_err(|e| StreamerError::Persistence(format!("failed to serialize record: {e}")))?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line)
            .await
            .map_err(|e| StreamerError::Persistence(format!("{}: {e}", self.path.display())))?;
        file.flush()
            .await
            .map_err(|e| StreamerError::Persistence(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}
