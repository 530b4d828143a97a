//! Background reconnect worker, one per provider.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::{Backoff, ReconnectPolicy};
use super::client::ProviderShared;
use crate::connection::ReconnectSignal;

/// Waits for reconnect signals and re-establishes the connection.
///
/// The provider mutex is held only inside `replace_connection`; hiccup and
/// backoff sleeps happen with it released. On exit the held connection is
/// closed.
pub(crate) async fn reconnect_loop(
    shared: Arc<ProviderShared>,
    mut signals: mpsc::UnboundedReceiver<ReconnectSignal>,
    policy: ReconnectPolicy,
    shutdown: CancellationToken,
) {
    let provider = shared.id.short().to_string();
    let mut first_wake = true;

    'worker: loop {
        let signal = tokio::select! {
            _ = shutdown.cancelled() => break 'worker,
            signal = signals.recv() => match signal {
                Some(signal) => signal,
                None => break 'worker,
            },
        };
        debug!(provider = %provider, ?signal, "reconnect requested");

        if first_wake {
            first_wake = false;
        } else if !policy.hiccup_delay.is_zero() {
            debug!(
                provider = %provider,
                delay_secs = policy.hiccup_delay.as_secs(),
                "waiting out backend hiccup"
            );
            if !sleep_or_cancel(policy.hiccup_delay, &shutdown).await {
                break 'worker;
            }
        }

        let mut backoff = Backoff::from_policy(&policy);
        loop {
            let attempt = tokio::select! {
                _ = shutdown.cancelled() => break 'worker,
                attempt = shared.replace_connection() => attempt,
            };

            match attempt {
                Ok(conn) => {
                    let coalesced = drain(&mut signals);
                    info!(
                        provider = %provider,
                        account = %shared.descriptor(),
                        failures = backoff.failures(),
                        coalesced,
                        "reconnected"
                    );
                    shared.restore_presence(&conn).await;
                    break;
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        provider = %provider,
                        account = %shared.descriptor(),
                        error = %e,
                        failures = backoff.failures(),
                        delay_secs = delay.as_secs(),
                        "reconnect failed, backing off"
                    );
                    if !sleep_or_cancel(delay, &shutdown).await {
                        break 'worker;
                    }
                }
            }
        }
    }

    // Also reached when the provider is dropped without `shutdown`.
    shared.release_connection().await;
    debug!(provider = %provider, "reconnect worker stopped");
}

/// Discard signals that piled up while an attempt was running.
fn drain(signals: &mut mpsc::UnboundedReceiver<ReconnectSignal>) -> usize {
    let mut count = 0;
    while signals.try_recv().is_ok() {
        count += 1;
    }
    count
}

/// Returns `false` if shutdown was requested before the delay elapsed.
async fn sleep_or_cancel(delay: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
