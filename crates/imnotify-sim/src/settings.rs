//! Mapping from the on-disk config to the presence core's timing types.

use std::time::Duration;

use imnotify_config::{PresenceConfig, ReconnectConfig};
use imnotify_presence::{BroadcastSchedule, ReconnectPolicy};

pub fn reconnect_policy(config: &ReconnectConfig) -> ReconnectPolicy {
    ReconnectPolicy {
        hiccup_delay: Duration::from_secs(config.hiccup_delay_secs),
        initial_backoff: Duration::from_secs(config.initial_backoff_secs),
        max_backoff: Duration::from_secs(config.max_backoff_secs),
    }
}

pub fn broadcast_schedule(config: &PresenceConfig) -> BroadcastSchedule {
    BroadcastSchedule {
        initial_delay: Duration::from_secs(config.initial_delay_secs),
        tick_interval: Duration::from_secs(config.tick_interval_secs),
        settle_delay: Duration::from_millis(config.settle_delay_ms),
        push_timeout: Duration::from_secs(config.push_timeout_secs),
    }
}
