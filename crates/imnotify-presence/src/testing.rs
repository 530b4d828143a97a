//! In-memory backend used by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use imnotify_common::ConnectionError;
use tokio::time::Instant;

use crate::connection::{BreakageNotifier, Connection, ConnectionFactory, Presence};

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) live: AtomicUsize,
    pub(crate) max_live: AtomicUsize,
}

pub(crate) struct MockConnection {
    counters: Arc<Counters>,
    opened: AtomicBool,
    connected: AtomicBool,
    closed: AtomicBool,
    listener: Mutex<Option<BreakageNotifier>>,
    presences: Arc<Mutex<Vec<(Presence, String)>>>,
    sent: Mutex<Vec<(String, String)>>,
    open_delay: Option<Duration>,
    hang_presence: bool,
}

impl MockConnection {
    /// Simulate the backend dropping the session.
    pub(crate) fn break_now(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let listener = self.listener.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.notify(Some("stream reset"));
        }
    }

    pub(crate) fn has_listener(&self) -> bool {
        self.listener.lock().unwrap().is_some()
    }

    pub(crate) fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn open(&self) -> Result<(), ConnectionError> {
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        self.opened.store(true, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        if self.opened.swap(false, Ordering::SeqCst) {
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, target: &str, text: &str) -> Result<(), ConnectionError> {
        self.sent
            .lock()
            .unwrap()
            .push((target.to_string(), text.to_string()));
        Ok(())
    }

    async fn set_presence(&self, presence: Presence, status: &str) -> Result<(), ConnectionError> {
        if self.hang_presence {
            std::future::pending::<()>().await;
        }
        self.presences
            .lock()
            .unwrap()
            .push((presence, status.to_string()));
        Ok(())
    }

    fn set_breakage_listener(&self, listener: Option<BreakageNotifier>) {
        *self.listener.lock().unwrap() = listener;
    }
}

/// Factory with a scripted sequence of connect outcomes.
///
/// `true` succeeds, `false` fails; once the script runs out every attempt
/// succeeds unless `always_fail` is set.
#[derive(Default)]
pub(crate) struct MockFactory {
    script: Mutex<VecDeque<bool>>,
    always_fail: bool,
    open_delay: Option<Duration>,
    hang_presence: bool,
    pub(crate) counters: Arc<Counters>,
    pub(crate) attempts: Mutex<Vec<Instant>>,
    pub(crate) created: Mutex<Vec<Arc<MockConnection>>>,
    pub(crate) presences: Arc<Mutex<Vec<(Presence, String)>>>,
}

impl MockFactory {
    pub(crate) fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn scripted(script: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.iter().copied().collect()),
            ..Default::default()
        })
    }

    pub(crate) fn broken() -> Arc<Self> {
        Arc::new(Self {
            always_fail: true,
            ..Default::default()
        })
    }

    pub(crate) fn slow_open(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            open_delay: Some(delay),
            ..Default::default()
        })
    }

    pub(crate) fn hanging_presence() -> Arc<Self> {
        Arc::new(Self {
            hang_presence: true,
            ..Default::default()
        })
    }

    pub(crate) fn push_script(&self, outcomes: &[bool]) {
        self.script.lock().unwrap().extend(outcomes.iter().copied());
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub(crate) fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn last_created(&self) -> Arc<MockConnection> {
        Arc::clone(self.created.lock().unwrap().last().expect("no connection created"))
    }

    pub(crate) fn presences(&self) -> Vec<(Presence, String)> {
        self.presences.lock().unwrap().clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub(crate) fn max_live(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    fn descriptor(&self) -> &str {
        "mock"
    }

    async fn create_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        self.attempts.lock().unwrap().push(Instant::now());
        let succeed = !self.always_fail && self.script.lock().unwrap().pop_front().unwrap_or(true);
        if !succeed {
            return Err(ConnectionError::ConnectFailed("backend unreachable".into()));
        }

        let conn = Arc::new(MockConnection {
            counters: Arc::clone(&self.counters),
            opened: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            listener: Mutex::new(None),
            presences: Arc::clone(&self.presences),
            sent: Mutex::new(Vec::new()),
            open_delay: self.open_delay,
            hang_presence: self.hang_presence,
        });
        self.created.lock().unwrap().push(Arc::clone(&conn));
        Ok(conn)
    }
}
