use async_trait::async_trait;
use imnotify_common::ConnectionError;
use tracing::debug;

use super::{BreakageNotifier, Connection, Presence};

/// Stand-in handed out while an account has no live session.
///
/// Messages are dropped with a debug log; presence updates fail with
/// [`ConnectionError::NotConnected`] so the broadcaster can skip the account.
#[derive(Debug, Clone)]
pub struct NullConnection {
    descriptor: String,
}

impl NullConnection {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
        }
    }
}

#[async_trait]
impl Connection for NullConnection {
    async fn open(&self) -> Result<(), ConnectionError> {
        Err(ConnectionError::NotConnected)
    }

    async fn close(&self) {}

    fn is_connected(&self) -> bool {
        false
    }

    async fn send(&self, target: &str, text: &str) -> Result<(), ConnectionError> {
        debug!(
            account = %self.descriptor,
            target,
            len = text.len(),
            "not connected, dropping message"
        );
        Ok(())
    }

    async fn set_presence(&self, _presence: Presence, _status: &str) -> Result<(), ConnectionError> {
        Err(ConnectionError::NotConnected)
    }

    fn set_breakage_listener(&self, _listener: Option<BreakageNotifier>) {}
}
