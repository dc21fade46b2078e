//! Protobuf framing for [`Message`].
//!
//! The browser client decodes frames with a generated protobuf reader:
//!
//! ```text
//! Message { oneof payload { State state = 1; Viewer viewer = 2; Comment comment = 3; } }
//! ```
//!
//! The payload structs carry their own prost field layout in `types.rs`.

use bytes::Bytes;
use prost::Message as _;

use super::types::{Comment, Message, Stage, State, Viewer};
use crate::error::CodecError;

/// Largest frame the encoder will produce.
pub const MAX_FRAME_LEN: usize = 1 << 20;

#[derive(Clone, PartialEq, prost::Message)]
struct Frame {
    #[prost(oneof = "Payload", tags = "1, 2, 3")]
    payload: Option<Payload>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
enum Payload {
    #[prost(message, tag = "1")]
    State(State),
    #[prost(message, tag = "2")]
    Viewer(Viewer),
    #[prost(message, tag = "3")]
    Comment(Comment),
}

impl From<Message> for Payload {
    fn from(message: Message) -> Self {
        match message {
            Message::State(state) => Payload::State(state),
            Message::Viewer(viewer) => Payload::Viewer(viewer),
            Message::Comment(comment) => Payload::Comment(comment),
        }
    }
}

impl From<Payload> for Message {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::State(state) => Message::State(state),
            Payload::Viewer(viewer) => Message::Viewer(viewer),
            Payload::Comment(comment) => Message::Comment(comment),
        }
    }
}

impl Message {
    /// Serialize into one binary frame.
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        let frame = Frame {
            payload: Some(self.clone().into()),
        };
        let len = frame.encoded_len();
        if len > MAX_FRAME_LEN {
            return Err(CodecError::TooLarge {
                len,
                max: MAX_FRAME_LEN,
            });
        }
        Ok(Bytes::from(frame.encode_to_vec()))
    }

    /// Parse one binary frame.
    pub fn decode(buf: &[u8]) -> Result<Message, CodecError> {
        let frame = Frame::decode(buf)?;
        let payload = frame.payload.ok_or(CodecError::EmptyMessage)?;
        if let Payload::State(state) = &payload {
            Stage::try_from(state.stage).map_err(|_| CodecError::UnknownStage(state.stage))?;
        }
        Ok(payload.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_wire_bytes() {
        let bytes = Message::Viewer(Viewer { count: 3 }).encode().unwrap();
        assert_eq!(&bytes[..], &[0x12, 0x02, 0x08, 0x03]);
    }

    #[test]
    fn state_omits_default_fields() {
        let state = State {
            presentation_id: 1,
            ..State::default()
        };
        let bytes = Message::State(state).encode().unwrap();
        assert_eq!(&bytes[..], &[0x0a, 0x02, 0x08, 0x01]);
    }

    #[test]
    fn state_wire_bytes_with_stage_and_info() {
        let state = State {
            presentation_id: 2,
            stage: Stage::Reviewing.into(),
            slide: 5,
            info: "qa".into(),
        };
        let bytes = Message::State(state).encode().unwrap();
        assert_eq!(
            &bytes[..],
            &[0x0a, 0x0a, 0x08, 0x02, 0x10, 0x02, 0x18, 0x05, 0x22, 0x02, b'q', b'a']
        );
    }

    #[test]
    fn comment_wire_bytes() {
        let bytes = Message::Comment(Comment {
            presentation_id: 0,
            text: "hi".into(),
        })
        .encode()
        .unwrap();
        assert_eq!(&bytes[..], &[0x1a, 0x04, 0x12, 0x02, b'h', b'i']);
    }

    #[test]
    fn default_payload_is_still_tagged() {
        let bytes = Message::Viewer(Viewer { count: 0 }).encode().unwrap();
        assert_eq!(&bytes[..], &[0x12, 0x00]);
        assert_eq!(
            Message::decode(&bytes).unwrap(),
            Message::Viewer(Viewer { count: 0 })
        );
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let messages = [
            Message::State(State {
                presentation_id: 42,
                stage: Stage::Speaking.into(),
                slide: 300,
                info: "質疑応答".into(),
            }),
            Message::Viewer(Viewer { count: u32::MAX }),
            Message::Comment(Comment {
                presentation_id: 7,
                text: "great talk 👏".into(),
            }),
        ];
        for msg in messages {
            let bytes = msg.encode().unwrap();
            assert_eq!(Message::decode(&bytes).unwrap(), msg);
        }
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let mut buf = Vec::new();
        // top-level field 15 varint, then a viewer with an extra field 5 inside
        buf.extend_from_slice(&[0x78, 0x05]);
        buf.extend_from_slice(&[0x12, 0x06, 0x08, 0x02, 0x2a, 0x02, b'x', b'y']);

        let msg = Message::decode(&buf).unwrap();
        assert_eq!(msg, Message::Viewer(Viewer { count: 2 }));
    }

    #[test]
    fn last_payload_wins() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&[0x12, 0x02, 0x08, 0x01]);
        buf.extend_from_slice(&[0x1a, 0x02, 0x08, 0x09]);
        assert_eq!(
            Message::decode(&buf).unwrap(),
            Message::Comment(Comment {
                presentation_id: 9,
                text: String::new()
            })
        );
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert_eq!(Message::decode(&[]), Err(CodecError::EmptyMessage));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        // truncated sub-message
        assert!(matches!(
            Message::decode(&[0x0a, 0x05, 0x08]),
            Err(CodecError::Decode(_))
        ));
        // invalid UTF-8 in comment text
        assert!(matches!(
            Message::decode(&[0x1a, 0x04, 0x12, 0x02, 0xff, 0xfe]),
            Err(CodecError::Decode(_))
        ));
        // field number 0
        assert!(matches!(Message::decode(&[0x00]), Err(CodecError::Decode(_))));
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let bytes = [0x0a, 0x02, 0x10, 0x09];
        assert_eq!(Message::decode(&bytes), Err(CodecError::UnknownStage(9)));
    }

    #[test]
    fn oversized_frame_fails_to_encode() {
        let msg = Message::Comment(Comment {
            presentation_id: 1,
            text: "a".repeat(MAX_FRAME_LEN),
        });
        assert!(matches!(
            msg.encode(),
            Err(CodecError::TooLarge { max: MAX_FRAME_LEN, .. })
        ));
    }
}
