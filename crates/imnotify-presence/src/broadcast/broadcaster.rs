//! The presence broadcaster service and its provider registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::scheduler::{SchedulerHandle, Trigger};
use super::types::{BroadcastSchedule, FleetOccupancy};
use crate::provider::ConnectionProvider;

/// Registered providers plus the scheduler that serves them.
///
/// Kept under one lock so that the last `unregister` (which stops the
/// scheduler) and a concurrent `register` (which starts one) cannot interleave.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) providers: Vec<Arc<ConnectionProvider>>,
    scheduler: Option<SchedulerHandle>,
}

pub(crate) fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pushes busy/idle presence to every registered [`ConnectionProvider`].
///
/// Must be used inside a tokio runtime: the first registration spawns the
/// scheduler task and the last unregistration stops it.
pub struct PresenceBroadcaster {
    fleet: Arc<dyn FleetOccupancy>,
    schedule: BroadcastSchedule,
    registry: Arc<Mutex<Registry>>,
}

impl PresenceBroadcaster {
    pub fn new(fleet: Arc<dyn FleetOccupancy>, schedule: BroadcastSchedule) -> Self {
        Self {
            fleet,
            schedule,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Add a provider. Registering the same provider twice is a no-op.
    ///
    /// Returns `true` if the provider was newly added.
    pub fn register(&self, provider: Arc<ConnectionProvider>) -> bool {
        let mut registry = lock_registry(&self.registry);
        if registry.providers.iter().any(|p| p.id() == provider.id()) {
            debug!(provider = %provider.id().short(), "provider already registered");
            return false;
        }

        info!(
            provider = %provider.id().short(),
            account = %provider.descriptor(),
            "registering provider for presence"
        );
        registry.providers.push(Arc::clone(&provider));

        if let Some(scheduler) = &registry.scheduler {
            scheduler.trigger(Trigger::Welcome(provider));
            return true;
        }

        registry.scheduler = Some(SchedulerHandle::spawn(
            Arc::clone(&self.fleet),
            self.schedule,
            Arc::downgrade(&self.registry),
        ));
        info!("presence broadcasting started");
        true
    }

    /// Remove a provider. Removing the last one stops the scheduler.
    ///
    /// Returns `true` if the provider was registered.
    pub fn unregister(&self, provider: &ConnectionProvider) -> bool {
        let mut registry = lock_registry(&self.registry);
        let before = registry.providers.len();
        registry.providers.retain(|p| p.id() != provider.id());
        if registry.providers.len() == before {
            debug!(provider = %provider.id().short(), "provider was not registered");
            return false;
        }

        debug!(provider = %provider.id().short(), "provider unregistered");
        if registry.providers.is_empty() && registry.scheduler.take().is_some() {
            info!("last provider gone, presence broadcasting stopped");
        }
        true
    }

    /// Build started, finished or was deleted: recompute once occupancy settles.
    pub fn on_build_event(&self) {
        match &lock_registry(&self.registry).scheduler {
            Some(scheduler) => scheduler.trigger(Trigger::BuildEvent),
            None => debug!("no providers registered, ignoring build event"),
        }
    }

    pub fn provider_count(&self) -> usize {
        lock_registry(&self.registry).providers.len()
    }

    pub fn is_running(&self) -> bool {
        lock_registry(&self.registry).scheduler.is_some()
    }

    /// Forget every provider and stop the scheduler.
    pub fn shutdown(&self) {
        let mut registry = lock_registry(&self.registry);
        registry.providers.clear();
        if registry.scheduler.take().is_some() {
            info!("presence broadcasting stopped");
        }
    }
}

impl std::fmt::Debug for PresenceBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceBroadcaster")
            .field("schedule", &self.schedule)
            .field("providers", &self.provider_count())
            .finish()
    }
}
