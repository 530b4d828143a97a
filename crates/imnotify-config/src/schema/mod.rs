//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod account;
mod presence;
mod reconnect;

pub use account::*;
pub use presence::*;
pub use reconnect::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImConfig {
    pub reconnect: ReconnectConfig,
    pub presence: PresenceConfig,
    #[serde(rename = "account")]
    pub accounts: Vec<AccountConfig>,
}
