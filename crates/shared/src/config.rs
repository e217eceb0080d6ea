//! Application configuration management.

use serde::Deserialize;

use crate::types::{ApiVersion, CurrencyPosition};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server profile used for formatting and decoding.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Background decoding settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-server profile settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// API revision the server speaks.
    #[serde(default = "default_api_version")]
    pub api_version: ApiVersion,
    /// Decimal separator typed by the user in amount fields.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
    /// Currency given to rows the user leaves without one.
    #[serde(default)]
    pub default_currency: String,
    /// Where the profile's currency symbol goes.
    #[serde(default)]
    pub currency_position: CurrencyPosition,
    /// Whether a space separates symbol and number.
    #[serde(default)]
    pub currency_gap: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            decimal_separator: default_decimal_separator(),
            default_currency: String::new(),
            currency_position: CurrencyPosition::default(),
            currency_gap: false,
        }
    }
}

fn default_api_version() -> ApiVersion {
    ApiVersion::latest()
}

fn default_decimal_separator() -> char {
    '.'
}

/// Background decoding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Capacity of the channel between the decoder and its consumer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    64
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info,ledgersync_core=debug".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `LEDGERSYNC__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERSYNC").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.profile.api_version, ApiVersion::V1_50);
        assert_eq!(config.profile.decimal_separator, '.');
        assert!(config.profile.default_currency.is_empty());
        assert_eq!(config.profile.currency_position, CurrencyPosition::Before);
        assert!(!config.profile.currency_gap);
        assert_eq!(config.sync.channel_capacity, 64);
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            [
                "LEDGERSYNC__PROFILE__API_VERSION",
                "LEDGERSYNC__PROFILE__DECIMAL_SEPARATOR",
                "LEDGERSYNC__SYNC__CHANNEL_CAPACITY",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.profile.api_version, ApiVersion::latest());
                assert_eq!(config.sync.channel_capacity, 64);
            },
        );
    }

    #[test]
    fn test_load_reads_environment() {
        temp_env::with_vars(
            [
                ("LEDGERSYNC__PROFILE__API_VERSION", Some("1.32")),
                ("LEDGERSYNC__PROFILE__DECIMAL_SEPARATOR", Some(",")),
                ("LEDGERSYNC__PROFILE__DEFAULT_CURRENCY", Some("EUR")),
                ("LEDGERSYNC__PROFILE__CURRENCY_POSITION", Some("after")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.profile.api_version, ApiVersion::V1_32);
                assert_eq!(config.profile.decimal_separator, ',');
                assert_eq!(config.profile.default_currency, "EUR");
                assert_eq!(config.profile.currency_position, CurrencyPosition::After);
            },
        );
    }
}
