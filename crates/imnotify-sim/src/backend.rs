//! A messaging backend that only writes to the log.
//!
//! Useful for watching the reconnect and presence machinery without a real
//! chat server: connects can be made to fail and live sessions can be dropped.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use imnotify_common::ConnectionError;
use imnotify_config::AccountConfig;
use imnotify_presence::{BreakageNotifier, Connection, ConnectionFactory, Presence};
use tracing::info;

pub struct LogConnection {
    account: String,
    connected: AtomicBool,
    listener: Mutex<Option<BreakageNotifier>>,
}

impl LogConnection {
    /// Pretend the server hung up on us.
    pub fn drop_session(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return;
        }
        info!(account = %self.account, "backend dropped the session");
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(listener) = listener {
            listener.notify(Some("simulated server disconnect"));
        }
    }
}

#[async_trait]
impl Connection for LogConnection {
    async fn open(&self) -> Result<(), ConnectionError> {
        self.connected.store(true, Ordering::SeqCst);
        info!(account = %self.account, "session opened");
        Ok(())
    }

    async fn close(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!(account = %self.account, "session closed");
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, target: &str, text: &str) -> Result<(), ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::Disconnected);
        }
        info!(account = %self.account, target, "> {text}");
        Ok(())
    }

    async fn set_presence(&self, presence: Presence, status: &str) -> Result<(), ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::Disconnected);
        }
        info!(account = %self.account, %presence, "presence: {status}");
        Ok(())
    }

    fn set_breakage_listener(&self, listener: Option<BreakageNotifier>) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = listener;
    }
}

pub struct LogBackendFactory {
    descriptor: String,
    failures_left: AtomicU32,
    current: Mutex<Option<Arc<LogConnection>>>,
}

impl LogBackendFactory {
    /// `flaky` is the number of connect attempts that fail before one succeeds.
    pub fn new(account: &AccountConfig, flaky: u32) -> Self {
        Self {
            descriptor: format!("{}@{}", account.nick, account.name),
            failures_left: AtomicU32::new(flaky),
            current: Mutex::new(None),
        }
    }

    /// Drop the most recently created session, if it is still up.
    pub fn drop_session(&self) {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(conn) = current {
            conn.drop_session();
        }
    }
}

#[async_trait]
impl ConnectionFactory for LogBackendFactory {
    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ConnectionError::ConnectFailed(format!(
                "{} refused the login",
                self.descriptor
            )));
        }

        let conn = Arc::new(LogConnection {
            account: self.descriptor.clone(),
            connected: AtomicBool::new(false),
            listener: Mutex::new(None),
        });
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&conn));
        Ok(conn)
    }
}
