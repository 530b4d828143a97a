pub mod errors;
pub mod id;

pub use errors::{ConfigError, ConnectionError, ImError};
pub use id::{new_id, ProviderId};

pub type Result<T> = std::result::Result<T, ImError>;
