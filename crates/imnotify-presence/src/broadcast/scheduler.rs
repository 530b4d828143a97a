//! Single-task scheduler that serializes every presence recomputation.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;
use tracing::{debug, info, trace, warn};

use super::broadcaster::{lock_registry, Registry};
use super::types::{
    BroadcastSchedule, FleetOccupancy, PresenceSnapshot, PresenceUpdate, PublishedSnapshot,
};
use crate::provider::ConnectionProvider;

pub(crate) enum Trigger {
    /// A build started, finished or was deleted.
    BuildEvent,
    /// A provider joined after presence was already published.
    Welcome(Arc<ConnectionProvider>),
}

/// Owner-side handle; dropping it stops the scheduler task.
pub(crate) struct SchedulerHandle {
    tx: mpsc::UnboundedSender<Trigger>,
    shutdown: CancellationToken,
}

impl SchedulerHandle {
    pub(crate) fn spawn(
        fleet: Arc<dyn FleetOccupancy>,
        schedule: BroadcastSchedule,
        registry: Weak<Mutex<Registry>>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let scheduler = Scheduler {
            fleet,
            schedule,
            registry,
            published: PublishedSnapshot::default(),
            last_update: None,
        };
        tokio::spawn(scheduler.run(rx, shutdown.clone()));
        Self { tx, shutdown }
    }

    pub(crate) fn trigger(&self, trigger: Trigger) {
        let _ = self.tx.send(trigger);
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Scheduler {
    fleet: Arc<dyn FleetOccupancy>,
    schedule: BroadcastSchedule,
    registry: Weak<Mutex<Registry>>,
    published: PublishedSnapshot,
    last_update: Option<PresenceUpdate>,
}

impl Scheduler {
    async fn run(mut self, mut triggers: mpsc::UnboundedReceiver<Trigger>, shutdown: CancellationToken) {
        let mut ticker = interval_at(
            Instant::now() + self.schedule.initial_delay,
            self.schedule.tick_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // One entry per build event; equal snapshots make the extra passes no-ops.
        let mut settling: DelayQueue<()> = DelayQueue::new();

        debug!("presence scheduler started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.recompute("tick").await,
                Some(_) = settling.next(), if !settling.is_empty() => {
                    self.recompute("build event").await;
                }
                trigger = triggers.recv() => match trigger {
                    Some(Trigger::BuildEvent) => {
                        settling.insert((), self.schedule.settle_delay);
                    }
                    Some(Trigger::Welcome(provider)) => self.welcome(provider).await,
                    None => break,
                },
            }
        }
        debug!("presence scheduler stopped");
    }

    async fn recompute(&mut self, reason: &'static str) {
        let snapshot = PresenceSnapshot::from_workers(&self.fleet.workers());
        if !self.published.publish(snapshot) {
            trace!(reason, busy = snapshot.busy, total = snapshot.total, "occupancy unchanged");
            return;
        }

        let update = PresenceUpdate::for_snapshot(snapshot, self.fleet.queue_length());
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let providers = lock_registry(&registry).providers.clone();
        drop(registry);

        info!(
            reason,
            busy = snapshot.busy,
            total = snapshot.total,
            presence = %update.presence,
            providers = providers.len(),
            "publishing presence"
        );
        let timeout = self.schedule.push_timeout;
        join_all(providers.iter().map(|p| push(p, &update, timeout))).await;
        self.last_update = Some(update);
    }

    async fn welcome(&self, provider: Arc<ConnectionProvider>) {
        if let Some(update) = &self.last_update {
            push(&provider, update, self.schedule.push_timeout).await;
        }
    }
}

/// Best-effort push to one account; failures stay with that account.
async fn push(provider: &ConnectionProvider, update: &PresenceUpdate, timeout: Duration) {
    match tokio::time::timeout(timeout, provider.set_presence(update.presence, &update.status)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            debug!(
                provider = %provider.id().short(),
                account = %provider.descriptor(),
                error = %e,
                "presence not pushed"
            );
        }
        Err(_) => {
            warn!(
                provider = %provider.id().short(),
                account = %provider.descriptor(),
                timeout_secs = timeout.as_secs(),
                "presence push timed out"
            );
        }
    }
}
