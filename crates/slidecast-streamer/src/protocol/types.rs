//! Wire message types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Phase of the presentation currently on stage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Stage {
    Paused = 0,
    Speaking = 1,
    Reviewing = 2,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Paused => "paused",
            Stage::Speaking => "speaking",
            Stage::Reviewing => "reviewing",
        };
        f.write_str(name)
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paused" | "pause" => Ok(Stage::Paused),
            "speaking" => Ok(Stage::Speaking),
            "reviewing" => Ok(Stage::Reviewing),
            other => Err(format!("unknown stage '{other}'")),
        }
    }
}

/// Full presentation snapshot.
///
/// `stage` holds the raw [`Stage`] number; use `stage()` and `set_stage()`.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct State {
    #[prost(uint32, tag = "1")]
    pub presentation_id: u32,
    #[prost(enumeration = "Stage", tag = "2")]
    pub stage: i32,
    #[prost(uint32, tag = "3")]
    pub slide: u32,
    #[prost(string, tag = "4")]
    pub info: String,
}

/// Number of viewers currently registered with the hub.
#[derive(Clone, Copy, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct Viewer {
    #[prost(uint32, tag = "1")]
    pub count: u32,
}

/// One relayed comment. The sender is carried out-of-band by the envelope.
#[derive(Clone, PartialEq, Eq, prost::Message, Serialize, Deserialize)]
pub struct Comment {
    #[prost(uint32, tag = "1")]
    pub presentation_id: u32,
    #[prost(string, tag = "2")]
    pub text: String,
}

/// A single frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Message {
    State(State),
    Viewer(Viewer),
    Comment(Comment),
}

impl Message {
    /// Short lowercase name of the variant, used in logs and audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::State(_) => "state",
            Message::Viewer(_) => "viewer",
            Message::Comment(_) => "comment",
        }
    }

    pub fn presentation_id(&self) -> Option<u32> {
        match self {
            Message::State(s) => Some(s.presentation_id),
            Message::Comment(c) => Some(c.presentation_id),
            Message::Viewer(_) => None,
        }
    }
}

impl From<State> for Message {
    fn from(state: State) -> Self {
        Message::State(state)
    }
}

impl From<Viewer> for Message {
    fn from(viewer: Viewer) -> Self {
        Message::Viewer(viewer)
    }
}

impl From<Comment> for Message {
    fn from(comment: Comment) -> Self {
        Message::Comment(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_parses_case_insensitively() {
        assert_eq!("Speaking".parse::<Stage>().unwrap(), Stage::Speaking);
        assert_eq!("pause".parse::<Stage>().unwrap(), Stage::Paused);
        assert!("dancing".parse::<Stage>().is_err());
    }

    #[test]
    fn stage_display_matches_parse() {
        for stage in [Stage::Paused, Stage::Speaking, Stage::Reviewing] {
            assert_eq!(stage.to_string().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn stage_wire_numbers() {
        assert_eq!(i32::from(Stage::Paused), 0);
        assert_eq!(i32::from(Stage::Reviewing), 2);
        assert_eq!(Stage::try_from(1), Ok(Stage::Speaking));
        assert!(Stage::try_from(7).is_err());
        assert_eq!(Stage::default(), Stage::Paused);
    }

    #[test]
    fn state_stage_accessors() {
        let mut state = State::default();
        assert_eq!(state.stage(), Stage::Paused);
        state.set_stage(Stage::Reviewing);
        assert_eq!(state.stage, 2);
        assert_eq!(state.stage(), Stage::Reviewing);
    }

    #[test]
    fn message_kind_and_presentation_id() {
        let msg = Message::from(Comment {
            presentation_id: 4,
            text: "nice".into(),
        });
        assert_eq!(msg.kind(), "comment");
        assert_eq!(msg.presentation_id(), Some(4));

        let msg = Message::from(Viewer { count: 2 });
        assert_eq!(msg.kind(), "viewer");
        assert_eq!(msg.presentation_id(), None);
    }

    #[test]
    fn message_json_is_tagged() {
        let msg = Message::Viewer(Viewer { count: 3 });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"kind":"viewer","count":3}"#);
    }
}
