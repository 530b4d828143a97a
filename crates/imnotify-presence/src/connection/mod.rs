//! The backend session contract.
//!
//! Concrete backends (XMPP, IRC, ...) live outside this crate and implement
//! [`Connection`] and [`ConnectionFactory`]. The provider only relies on the
//! contract described here.

mod null;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use imnotify_common::ConnectionError;

pub use null::NullConnection;
pub use types::{BreakageNotifier, Presence};
pub(crate) use types::ReconnectSignal;

/// A live session to a messaging backend for one account.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Establish the session. Called once, right after the factory built it.
    async fn open(&self) -> Result<(), ConnectionError>;

    /// Tear the session down. Must not report breakage to the listener.
    async fn close(&self);

    fn is_connected(&self) -> bool;

    async fn send(&self, target: &str, text: &str) -> Result<(), ConnectionError>;

    async fn set_presence(&self, presence: Presence, status: &str) -> Result<(), ConnectionError>;

    /// Install or remove the single breakage listener.
    ///
    /// Implementations call [`BreakageNotifier::notify`] from whatever thread
    /// notices the backend going away; the call never blocks.
    fn set_breakage_listener(&self, listener: Option<BreakageNotifier>);
}

/// Builds connections for one configured account.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Human-readable account descriptor used in log lines.
    fn descriptor(&self) -> &str;

    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError>;
}
