use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a connection's registry key.
pub const SESSION_KEY_LEN: usize = 20;

/// Random alphanumeric key used to index a connection in the hub registry.
pub fn new_session_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LEN)
        .map(char::from)
        .collect()
}

/// Per-session viewer identity.
///
/// The nil UUID is reserved for frames the hub originates itself (relayed
/// comments); `UserId::new` never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(uuid::Uuid);

impl UserId {
    pub const NIL: UserId = UserId(uuid::Uuid::nil());

    pub fn new() -> Self {
        // v4 UUIDs carry version bits, so they can never equal nil.
        Self(uuid::Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
