use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures raised by a messaging backend session.
///
/// None of these are fatal: the provider and broadcaster catch them at the
/// call site and turn them into a log line plus a retry or a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("connection dropped by backend")]
    Disconnected,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("presence update failed: {0}")]
    PresenceFailed(String),

    #[error("not connected")]
    NotConnected,
}

#[derive(Debug, thiserror::Error)]
pub enum ImError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("reconnect.max_backoff_secs must be > 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: reconnect.max_backoff_secs must be > 0"
        );
    }

    #[test]
    fn connection_error_display() {
        let err = ConnectionError::ConnectFailed("auth rejected".into());
        assert_eq!(err.to_string(), "connect failed: auth rejected");

        assert_eq!(
            ConnectionError::Disconnected.to_string(),
            "connection dropped by backend"
        );
        assert_eq!(ConnectionError::NotConnected.to_string(), "not connected");

        let err = ConnectionError::PresenceFailed("stanza rejected".into());
        assert_eq!(err.to_string(), "presence update failed: stanza rejected");
    }

    #[test]
    fn im_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: ImError = config_err.into();
        assert!(matches!(err, ImError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn im_error_from_connection() {
        let err: ImError = ConnectionError::SendFailed("socket closed".into()).into();
        assert!(matches!(err, ImError::Connection(_)));
        assert_eq!(err.to_string(), "send failed: socket closed");
    }

    #[test]
    fn im_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ImError = io_err.into();
        assert!(matches!(err, ImError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn connection_error_is_comparable() {
        assert_eq!(ConnectionError::NotConnected, ConnectionError::NotConnected);
        assert_ne!(
            ConnectionError::ConnectFailed("a".into()),
            ConnectionError::ConnectFailed("b".into())
        );
    }
}
