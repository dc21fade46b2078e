//! Error types for the wire codec and the hub.

use tokio_tungstenite::tungstenite;

/// Failure to encode or decode a wire [`Message`](crate::protocol::Message).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The frame is not valid protobuf for [`Message`](crate::protocol::Message).
    #[error("malformed frame: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("unknown stage value {0}")]
    UnknownStage(i32),

    #[error("message carries no payload")]
    EmptyMessage,

    #[error("encoded frame is {len} bytes, limit is {max}")]
    TooLarge { len: usize, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum StreamerError {
    /// The connection is no longer open.
    #[error("connection already closed")]
    AlreadyClosed,

    /// The outbound queue is saturated; the frame was dropped.
    #[error("outbound buffer is full")]
    BufferFull,

    #[error("encoding failed: {0}")]
    Encoding(#[from] CodecError),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// The hub event loop has stopped and no longer accepts viewers.
    #[error("hub is not running")]
    HubClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_display() {
        assert_eq!(
            CodecError::TooLarge { len: 10, max: 5 }.to_string(),
            "encoded frame is 10 bytes, limit is 5"
        );
        assert_eq!(
            CodecError::UnknownStage(9).to_string(),
            "unknown stage value 9"
        );
    }

    #[test]
    fn decode_error_is_wrapped() {
        let err = CodecError::from(prost::DecodeError::new("bad tag"));
        assert!(err.to_string().starts_with("malformed frame: "));
    }

    #[test]
    fn streamer_error_from_codec() {
        let err: StreamerError = CodecError::EmptyMessage.into();
        assert!(matches!(err, StreamerError::Encoding(CodecError::EmptyMessage)));
        assert!(err.to_string().contains("no payload"));
    }

    #[test]
    fn streamer_error_display() {
        assert_eq!(
            StreamerError::AlreadyClosed.to_string(),
            "connection already closed"
        );
        assert_eq!(StreamerError::BufferFull.to_string(), "outbound buffer is full");
        assert_eq!(StreamerError::HubClosed.to_string(), "hub is not running");
        assert_eq!(
            StreamerError::Persistence("disk full".into()).to_string(),
            "persistence failed: disk full"
        );
    }
}
