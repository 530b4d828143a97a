//! Configuration validation.
//!
//! Collects every problem into a single error so users can fix them in one pass.

use std::collections::HashSet;

use crate::schema::ImConfig;
use imnotify_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ImConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let reconnect = &config.reconnect;
    validate_nonzero(&mut errors, "reconnect.initial_backoff_secs", reconnect.initial_backoff_secs);
    validate_nonzero(&mut errors, "reconnect.max_backoff_secs", reconnect.max_backoff_secs);
    if reconnect.initial_backoff_secs > reconnect.max_backoff_secs {
        errors.push(format!(
            "reconnect.initial_backoff_secs = {} exceeds reconnect.max_backoff_secs = {}",
            reconnect.initial_backoff_secs, reconnect.max_backoff_secs
        ));
    }

    let presence = &config.presence;
    validate_nonzero(&mut errors, "presence.tick_interval_secs", presence.tick_interval_secs);
    validate_nonzero(&mut errors, "presence.push_timeout_secs", presence.push_timeout_secs);

    let mut seen = HashSet::new();
    for (i, account) in config.accounts.iter().enumerate() {
        if account.name.trim().is_empty() {
            errors.push(format!("account[{i}].name must not be empty"));
        } else if !seen.insert(account.name.as_str()) {
            errors.push(format!("duplicate account name '{}'", account.name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_nonzero(errors: &mut Vec<String>, name: &str, value: u64) {
    if value == 0 {
        errors.push(format!("{name} must be greater than 0"));
    }
}
