//! The per-account connection owner.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use imnotify_common::{ConnectionError, ProviderId};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::ReconnectPolicy;
use super::worker::reconnect_loop;
use crate::connection::{
    BreakageNotifier, Connection, ConnectionFactory, NullConnection, Presence, ReconnectSignal,
};

/// State shared between the provider handle and its reconnect worker.
pub(crate) struct ProviderShared {
    pub(crate) id: ProviderId,
    factory: Arc<dyn ConnectionFactory>,
    /// Guards creation and release of the connection, never a backoff sleep.
    connection: Mutex<Option<Arc<dyn Connection>>>,
    placeholder: Arc<dyn Connection>,
    notifier: BreakageNotifier,
    first_connect_attempted: AtomicBool,
    reconnect_attempts: AtomicU64,
    /// Last presence requested by the broadcaster, re-applied after a reconnect.
    desired_presence: Mutex<Option<(Presence, String)>>,
}

impl ProviderShared {
    pub(crate) fn descriptor(&self) -> &str {
        self.factory.descriptor()
    }

    pub(crate) fn arm(&self, signal: ReconnectSignal) {
        self.notifier.arm(signal);
    }

    /// Build, open and subscribe to a fresh connection.
    ///
    /// If this future is dropped mid-`open`, the half-built connection is
    /// still closed.
    async fn open_new(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        let mut pending = PendingConnection {
            conn: self.factory.create_connection().await?,
            accepted: false,
        };
        pending.conn.open().await?;
        pending.conn.set_breakage_listener(Some(self.notifier.clone()));
        pending.accepted = true;
        Ok(Arc::clone(&pending.conn))
    }

    /// Drop whatever connection is held and try to open a new one.
    pub(crate) async fn replace_connection(&self) -> Result<Arc<dyn Connection>, ConnectionError> {
        let mut slot = self.connection.lock().await;
        release(&mut slot).await;
        self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
        let conn = self.open_new().await?;
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }

    pub(crate) async fn release_connection(&self) {
        let mut slot = self.connection.lock().await;
        if release(&mut slot).await {
            info!(provider = %self.id.short(), account = %self.descriptor(), "connection released");
        }
    }

    /// Push the last requested presence onto a freshly opened connection.
    pub(crate) async fn restore_presence(&self, conn: &Arc<dyn Connection>) {
        let desired = self.desired_presence.lock().await.clone();
        if let Some((presence, status)) = desired {
            if let Err(e) = conn.set_presence(presence, &status).await {
                debug!(provider = %self.id.short(), error = %e, "could not restore presence");
            }
        }
    }
}

async fn release(slot: &mut Option<Arc<dyn Connection>>) -> bool {
    match slot.take() {
        Some(conn) => {
            conn.set_breakage_listener(None);
            conn.close().await;
            true
        }
        None => false,
    }
}

/// A connection that is not installed in the slot yet.
///
/// Dropping it (open failed, or the attempt was cancelled) closes it in the
/// background.
struct PendingConnection {
    conn: Arc<dyn Connection>,
    accepted: bool,
}

impl Drop for PendingConnection {
    fn drop(&mut self) {
        if self.accepted {
            return;
        }
        let conn = Arc::clone(&self.conn);
        conn.set_breakage_listener(None);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { conn.close().await });
        }
    }
}

/// Wakes the reconnect worker unless the inline connect completed.
///
/// Covers callers that time out while the first connect is still running.
struct InlineAttempt<'a> {
    shared: &'a ProviderShared,
    done: bool,
}

impl Drop for InlineAttempt<'_> {
    fn drop(&mut self) {
        if !self.done {
            debug!(provider = %self.shared.id.short(), "inline connect abandoned, handing over to worker");
            self.shared.arm(ReconnectSignal::Missing);
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Owns at most one [`Connection`] for a configured account.
///
/// Must be created inside a tokio runtime: construction spawns the reconnect
/// worker, which runs until [`shutdown`](Self::shutdown) or drop. Either way
/// the worker closes the connection on its way out.
pub struct ConnectionProvider {
    shared: Arc<ProviderShared>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionProvider {
    pub fn new(factory: Arc<dyn ConnectionFactory>, policy: ReconnectPolicy) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let descriptor = factory.descriptor().to_string();
        let shared = Arc::new(ProviderShared {
            id: ProviderId::new(),
            factory,
            connection: Mutex::new(None),
            placeholder: Arc::new(NullConnection::new(descriptor)),
            notifier: BreakageNotifier::new(signal_tx),
            first_connect_attempted: AtomicBool::new(false),
            reconnect_attempts: AtomicU64::new(0),
            desired_presence: Mutex::new(None),
        });
        let shutdown = CancellationToken::new();

        let worker = tokio::spawn(reconnect_loop(
            Arc::clone(&shared),
            signal_rx,
            policy,
            shutdown.clone(),
        ));
        debug!(provider = %shared.id.short(), account = %shared.descriptor(), "provider created");

        Self {
            shared,
            shutdown,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn id(&self) -> &ProviderId {
        &self.shared.id
    }

    pub fn descriptor(&self) -> &str {
        self.shared.descriptor()
    }

    /// The live connection, or a placeholder while the account is down.
    ///
    /// The first call with no connection tries to open one inline. After
    /// that, a missing connection only wakes the reconnect worker.
    pub async fn current_connection(&self) -> Arc<dyn Connection> {
        let mut slot = self.shared.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Arc::clone(conn);
        }

        if !self.shared.first_connect_attempted.swap(true, Ordering::SeqCst) {
            let mut attempt = InlineAttempt {
                shared: &self.shared,
                done: false,
            };
            let result = self.shared.open_new().await;
            attempt.done = true;
            match result {
                Ok(conn) => {
                    info!(provider = %self.id().short(), account = %self.descriptor(), "connected");
                    *slot = Some(Arc::clone(&conn));
                    return conn;
                }
                Err(e) => {
                    warn!(
                        provider = %self.id().short(),
                        account = %self.descriptor(),
                        error = %e,
                        "initial connect failed, retrying in background"
                    );
                }
            }
        }
        drop(slot);

        self.shared.arm(ReconnectSignal::Missing);
        Arc::clone(&self.shared.placeholder)
    }

    /// Wake the reconnect worker so the connection is opened in the background.
    pub fn connect_in_background(&self) {
        self.shared.arm(ReconnectSignal::Missing);
    }

    /// Close and forget the current connection, if any. Idempotent.
    pub async fn release_connection(&self) {
        self.shared.release_connection().await;
    }

    /// Breakage callback for backends that report through the provider
    /// rather than through a [`BreakageNotifier`]. Never blocks.
    pub fn connection_broken(&self, cause: Option<&str>) {
        self.shared.notifier.notify(cause);
    }

    pub async fn is_connected(&self) -> bool {
        self.shared
            .connection
            .lock()
            .await
            .as_ref()
            .is_some_and(|conn| conn.is_connected())
    }

    /// Number of connect attempts made by the reconnect worker.
    pub fn reconnect_attempts(&self) -> u64 {
        self.shared.reconnect_attempts.load(Ordering::Relaxed)
    }

    /// Send a message, dropping it with a warning if the backend refuses.
    pub async fn send(&self, target: &str, text: &str) {
        let conn = self.current_connection().await;
        if let Err(e) = conn.send(target, text).await {
            warn!(
                provider = %self.id().short(),
                account = %self.descriptor(),
                target,
                error = %e,
                "send failed"
            );
        }
    }

    /// Publish presence and remember it for the next reconnect.
    pub async fn set_presence(&self, presence: Presence, status: &str) -> Result<(), ConnectionError> {
        *self.shared.desired_presence.lock().await = Some((presence, status.to_string()));
        self.current_connection()
            .await
            .set_presence(presence, status)
            .await
    }

    /// Stop the reconnect worker and release the connection.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let worker = self.worker.lock().await.take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
        self.shared.release_connection().await;
        debug!(provider = %self.id().short(), "provider stopped");
    }
}

impl Drop for ConnectionProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("id", &self.shared.id)
            .field("account", &self.descriptor())
            .finish()
    }
}
