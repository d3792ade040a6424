use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{GatewayError, Result};
use crate::gateway::PollerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub connect: ConnectConfig,
    #[serde(default)]
    pub poller: PollerSettings,
    #[serde(default)]
    pub datafeed: DatafeedSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Venue credentials and endpoint. All three options are required;
/// `validate` reports every missing key at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectConfig {
    pub token: String,
    pub endpoint: String,
    pub account_id: String,
}

impl ConnectConfig {
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.token.trim().is_empty() {
            missing.push("token");
        }
        if self.endpoint.trim().is_empty() {
            missing.push("endpoint");
        }
        if self.account_id.trim().is_empty() {
            missing.push("account_id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Config(format!(
                "missing connect options: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerSettings {
    /// Seconds between reconciliation cycles
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    3
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
        }
    }
}

impl From<&PollerSettings> for PollerConfig {
    fn from(settings: &PollerSettings) -> Self {
        Self {
            interval: Duration::from_secs(settings.interval_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatafeedSettings {
    /// Venue-imposed cap on the tick history window
    #[serde(default = "default_tick_lookback")]
    pub max_tick_lookback_days: i64,
}

fn default_tick_lookback() -> i64 {
    180
}

impl Default for DatafeedSettings {
    fn default() -> Self {
        Self {
            max_tick_lookback_days: default_tick_lookback(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("connect.token", "")?
            .set_default("connect.endpoint", "")?
            .set_default("connect.account_id", "")?
            .set_default("poller.interval_secs", 3)?
            .set_default("datafeed.max_tick_lookback_days", 180)?
            .set_default("logging.level", "info")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GMLINK_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GMLINK_CONNECT__TOKEN, etc.)
            .add_source(
                Environment::with_prefix("GMLINK")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values, collecting every problem
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.connect.validate() {
            errors.push(e.to_string());
        }
        if self.poller.interval_secs == 0 {
            errors.push("poller.interval_secs must be positive".to_string());
        }
        if self.datafeed.max_tick_lookback_days <= 0 {
            errors.push("datafeed.max_tick_lookback_days must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_connect() -> ConnectConfig {
        ConnectConfig {
            token: "t".to_string(),
            endpoint: "http://gm.example".to_string(),
            account_id: "acct-1".to_string(),
        }
    }

    #[test]
    fn connect_config_reports_all_missing_keys() {
        let err = ConnectConfig::default().validate().expect_err("must fail");
        let message = err.to_string();
        assert!(message.contains("token"));
        assert!(message.contains("endpoint"));
        assert!(message.contains("account_id"));
        assert!(err.is_fatal());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = AppConfig {
            connect: valid_connect(),
            poller: PollerSettings { interval_secs: 0 },
            datafeed: DatafeedSettings::default(),
            logging: LoggingConfig::default(),
        };
        let errors = config.validate().expect_err("must fail");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("interval_secs"));
    }

    #[test]
    fn valid_config_passes() {
        let config = AppConfig {
            connect: valid_connect(),
            poller: PollerSettings::default(),
            datafeed: DatafeedSettings::default(),
            logging: LoggingConfig::default(),
        };
        assert!(config.validate().is_ok());
    }
}
