//! Configuration for the build-farm notifier.
//!
//! Provides TOML-based configuration for accounts, the reconnect policy and
//! the presence schedule. All sections use defaults so partial configs work.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{AccountConfig, ImConfig, PresenceConfig, ReconnectConfig};
pub use toml_loader::{load_default, load_from_path, parse_str};
pub use validation::validate;
