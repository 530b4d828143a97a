use serde::{Deserialize, Serialize};

/// Reconnect timing for every account's connection provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Pause before reconnecting after a drop, to ride out short outages.
    pub hiccup_delay_secs: u64,
    /// Delay after the first failed attempt; doubles on every further failure.
    pub initial_backoff_secs: u64,
    /// Upper bound for the doubled delay.
    pub max_backoff_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            hiccup_delay_secs: 30,
            initial_backoff_secs: 60,
            max_backoff_secs: 60 * 60,
        }
    }
}
