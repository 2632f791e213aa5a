//! # Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML file, then
//! `DISPATCH_*` environment variables (`DISPATCH_OPTIMIZER_URL`, `DISPATCH_TICK_INTERVAL_MS`, ...).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DispatchConfig {
    pub optimizer_url: String,
    pub eta_url: String,
    /// Roster endpoint. Without one the built-in five-carrier roster is used.
    #[serde(default)]
    pub roster_url: Option<String>,
    /// Bound on each optimizer, ETA and roster call.
    pub request_timeout_ms: u64,
    /// Simulator step.
    pub tick_interval_ms: u64,
    /// Request queue capacity of each store.
    pub store_buffer: usize,
}

impl DispatchConfig {
    /// Defaults, overlaid with `path` when given (missing file is fine), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config: Self = builder
            .add_source(Environment::with_prefix("DISPATCH"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with a TOML document. The environment is not consulted.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the runtime cannot work with. Zero durations and a zero queue capacity
    /// are refused here rather than panicking in the timer or channel constructors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("tick_interval_ms", self.tick_interval_ms),
            ("store_buffer", self.store_buffer as u64),
        ];
        match positive.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::Message(format!(
                "{field} must be greater than zero"
            ))),
            None => Ok(()),
        }
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("optimizer_url", "http://localhost:8080/run-optimizer")?
            .set_default("eta_url", "http://localhost:8081/predict")?
            .set_default("request_timeout_ms", 30_000)?
            .set_default("tick_interval_ms", 1_000)?
            .set_default("store_buffer", 32)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let config = DispatchConfig::from_toml_str("").unwrap();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.store_buffer, 32);
        assert_eq!(config.roster_url, None);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = DispatchConfig::from_toml_str(
            r#"
            optimizer_url = "https://opt.example/run"
            roster_url = "https://roster.example/carriers"
            request_timeout_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.optimizer_url, "https://opt.example/run");
        assert_eq!(config.roster_url.as_deref(), Some("https://roster.example/carriers"));
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.eta_url, "http://localhost:8081/predict");
    }

    #[test]
    fn test_bad_value_is_an_error() {
        assert!(DispatchConfig::from_toml_str("tick_interval_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        let err = DispatchConfig::from_toml_str("tick_interval_ms = 0").unwrap_err();
        assert_eq!(err.to_string(), "tick_interval_ms must be greater than zero");
    }

    #[test]
    fn test_zero_store_buffer_is_rejected() {
        let err = DispatchConfig::from_toml_str("store_buffer = 0").unwrap_err();
        assert_eq!(err.to_string(), "store_buffer must be greater than zero");
    }

    #[test]
    fn test_zero_request_timeout_is_rejected() {
        let err = DispatchConfig::from_toml_str("request_timeout_ms = 0").unwrap_err();
        assert_eq!(err.to_string(), "request_timeout_ms must be greater than zero");
    }

    #[test]
    fn test_validate_catches_hand_built_config() {
        let mut config = DispatchConfig::from_toml_str("").unwrap();
        assert!(config.validate().is_ok());
        config.store_buffer = 0;
        assert!(config.validate().is_err());
    }
}
