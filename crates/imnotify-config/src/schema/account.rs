use serde::{Deserialize, Serialize};

/// One messaging account. Each gets its own connection provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub name: String,
    /// Backend identifier handed to the connection factory (e.g. "jabber").
    pub backend: String,
    pub nick: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .field("nick", &self.nick)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            backend: "jabber".into(),
            nick: "buildbot".into(),
            password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let account = AccountConfig {
            name: "ops".into(),
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let out = format!("{account:?}");
        assert!(out.contains("[REDACTED]"));
        assert!(!out.contains("hunter2"));
    }
}
