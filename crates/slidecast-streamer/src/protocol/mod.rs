//! Wire protocol: the three-variant [`Message`] union and its binary codec.

mod codec;
mod types;

pub use codec::MAX_FRAME_LEN;
pub use types::{Comment, Message, Stage, State, Viewer};
