pub mod errors;
pub mod id;

pub use errors::{ConfigError, SlidecastError};
pub use id::{new_session_key, UserId, SESSION_KEY_LEN};

pub type Result<T> = std::result::Result<T, SlidecastError>;
