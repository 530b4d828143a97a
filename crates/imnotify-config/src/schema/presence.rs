use serde::{Deserialize, Serialize};

/// Busy/idle presence broadcasting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub enabled: bool,
    pub initial_delay_secs: u64,
    pub tick_interval_secs: u64,
    /// How long to let fleet occupancy settle after a build event.
    pub settle_delay_ms: u64,
    /// Per-account limit on a single presence push.
    pub push_timeout_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_secs: 10,
            tick_interval_secs: 60,
            settle_delay_ms: 1000,
            push_timeout_secs: 30,
        }
    }
}
