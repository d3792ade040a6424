use thiserror::Error;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    // Configuration errors: the only category allowed to fail connect outright
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    // A canonical enum/field with no venue mapping
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    // A query parameter outside venue limits
    #[error("Query out of range: {0}")]
    Range(String),

    // Transient venue/API failures
    #[error("Venue error: {0}")]
    Vendor(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // An inbound record carrying a code outside the known tables
    #[error("Unmappable record: {0}")]
    UnmappableRecord(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Whether this error may abort an active session. Everything except
    /// configuration problems degrades to a logged no-op instead.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Config(_) | GatewayError::ConfigFile(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(GatewayError::Config("token missing".into()).is_fatal());
        assert!(!GatewayError::Vendor("timeout".into()).is_fatal());
        assert!(!GatewayError::UnsupportedValue("offset".into()).is_fatal());
        assert!(!GatewayError::UnmappableRecord("status 99".into()).is_fatal());
        assert!(!GatewayError::Range("window too long".into()).is_fatal());
    }
}
