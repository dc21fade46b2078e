//! Internal queue unit: payload bytes plus routing metadata.

use bytes::Bytes;
use slidecast_common::UserId;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::CodecError;
use crate::protocol::Message;

/// WebSocket close code 1012, "service restart".
pub const CLOSE_SERVICE_RESTART: u16 = 1012;

/// How the payload is framed on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// One serialized [`Message`].
    Binary,
    /// Close notification; the outbound worker stops after writing it.
    Close { code: u16, reason: String },
}

/// A frame in flight between the hub and a connection.
///
/// Cloning is cheap: the payload is reference counted, so a broadcast shares
/// one allocation across every recipient.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Viewer the frame is addressed to or originated from. Nil for frames
    /// the hub produces itself.
    pub user_id: UserId,
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl Envelope {
    pub fn binary(user_id: UserId, payload: Bytes) -> Self {
        Self {
            user_id,
            kind: FrameKind::Binary,
            payload,
        }
    }

    /// Serialize `message` into a binary envelope.
    pub fn encode(user_id: UserId, message: &Message) -> Result<Self, CodecError> {
        Ok(Self::binary(user_id, message.encode()?))
    }

    pub fn close(code: u16, reason: impl Into<String>) -> Self {
        Self {
            user_id: UserId::NIL,
            kind: FrameKind::Close {
                code,
                reason: reason.into(),
            },
            payload: Bytes::new(),
        }
    }

    pub fn is_close(&self) -> bool {
        matches!(self.kind, FrameKind::Close { .. })
    }

    /// Parse the payload back into a [`Message`].
    pub fn decode(&self) -> Result<Message, CodecError> {
        Message::decode(&self.payload)
    }

    pub(crate) fn to_ws_message(&self) -> WsMessage {
        match &self.kind {
            FrameKind::Binary => WsMessage::Binary(self.payload.clone()),
            FrameKind::Close { code, reason } => WsMessage::Close(Some(CloseFrame {
                code: CloseCode::from(*code),
                reason: reason.clone().into(),
            })),
        }
    }
}
