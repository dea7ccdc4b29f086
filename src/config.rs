//! Configuration management for flakeguard

use crate::wait::WaitSpec;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::Level;

pub mod store;

pub use store::{ConfigRule, ConfigStore, ConfigValue};

/// Resilience layer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Implicit wait in milliseconds
    pub implicit_wait_ms: u64,

    /// Explicit wait in milliseconds (state validator timeout)
    pub explicit_wait_ms: u64,

    /// Page load timeout in milliseconds
    pub page_load_timeout_ms: u64,

    /// Script timeout in milliseconds
    pub script_timeout_ms: u64,

    /// Base polling interval in milliseconds
    pub polling_interval_ms: u64,

    /// Upper bound for the polling interval in milliseconds
    pub polling_max_interval_ms: u64,

    /// Adaptive wait timeout used by strategies, in milliseconds
    pub wait_timeout_ms: u64,

    /// Adaptive wait minimum poll interval in milliseconds
    pub wait_min_poll_ms: u64,

    /// Adaptive wait maximum poll interval in milliseconds
    pub wait_max_poll_ms: u64,

    /// Grow the poll interval after each failed poll
    pub wait_progressive: bool,

    /// Poll interval growth factor
    pub wait_factor: f64,

    /// Maximum number of polls per wait
    pub wait_retry_attempts: u32,

    /// Default retry attempts
    pub retry_max_attempts: u32,

    /// Retry backoff multiplier
    pub retry_backoff_multiplier: f64,

    /// Response time above which the network counts as poor, in milliseconds
    pub network_latency_threshold_ms: u64,

    /// JS heap usage above which the page counts as unstable, in bytes
    pub heap_unstable_bytes: u64,

    /// Memory usage threshold in percent
    pub memory_usage_threshold: u32,

    /// CPU usage above which polling slows down, in percent
    pub cpu_usage_threshold: f64,

    /// Comma-separated overlay selectors hidden on intercepted clicks
    pub overlay_selectors: String,

    /// Delay after scrolling before a primitive interaction, in milliseconds
    pub settle_delay_ms: u64,

    /// Settle delay of the not-interactable remedy, in milliseconds
    pub recovery_settle_ms: u64,

    /// Pause between pointer move and press, in milliseconds
    pub pointer_pause_ms: u64,

    /// Poll interval of background state watchers, in milliseconds
    pub monitor_poll_ms: u64,

    /// Default timeout in seconds
    pub default_timeout_secs: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            implicit_wait_ms: 10_000,
            explicit_wait_ms: 20_000,
            page_load_timeout_ms: 30_000,
            script_timeout_ms: 10_000,
            polling_interval_ms: 500,
            polling_max_interval_ms: 2_000,
            wait_timeout_ms: 10_000,
            wait_min_poll_ms: 250,
            wait_max_poll_ms: 2_000,
            wait_progressive: true,
            wait_factor: 2.0,
            wait_retry_attempts: 3,
            retry_max_attempts: 3,
            retry_backoff_multiplier: 1.5,
            network_latency_threshold_ms: 1_000,
            heap_unstable_bytes: 100_000_000,
            memory_usage_threshold: 80,
            cpu_usage_threshold: 70.0,
            overlay_selectors: ".overlay, .modal, .dialog".to_string(),
            settle_delay_ms: 300,
            recovery_settle_ms: 500,
            pointer_pause_ms: 200,
            monitor_poll_ms: 100,
            default_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::configuration(format!("Invalid {}", name))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Some(v) = parse_var("FLAKEGUARD_IMPLICIT_WAIT_MS")? {
            config.implicit_wait_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_EXPLICIT_WAIT_MS")? {
            config.explicit_wait_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_PAGE_LOAD_TIMEOUT_MS")? {
            config.page_load_timeout_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_POLLING_INTERVAL_MS")? {
            config.polling_interval_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_WAIT_TIMEOUT_MS")? {
            config.wait_timeout_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_WAIT_MIN_POLL_MS")? {
            config.wait_min_poll_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_WAIT_MAX_POLL_MS")? {
            config.wait_max_poll_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_WAIT_PROGRESSIVE")? {
            config.wait_progressive = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_WAIT_FACTOR")? {
            config.wait_factor = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_RETRY_MAX_ATTEMPTS")? {
            config.retry_max_attempts = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_LATENCY_THRESHOLD_MS")? {
            config.network_latency_threshold_ms = v;
        }

        if let Some(v) = parse_var("FLAKEGUARD_SETTLE_DELAY_MS")? {
            config.settle_delay_ms = v;
        }

        if let Ok(selectors) = env::var("FLAKEGUARD_OVERLAY_SELECTORS") {
            config.overlay_selectors = selectors;
        }

        if let Ok(log_level) = env::var("FLAKEGUARD_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values no wait or retry loop can run with
    pub fn validate(&self) -> Result<()> {
        if self.wait_factor < 1.0 {
            return Err(Error::configuration("wait_factor must be >= 1.0"));
        }
        if self.wait_min_poll_ms > self.wait_max_poll_ms {
            return Err(Error::configuration(
                "wait_min_poll_ms must not exceed wait_max_poll_ms",
            ));
        }
        if self.wait_retry_attempts == 0 {
            return Err(Error::configuration("wait_retry_attempts must be > 0"));
        }
        Ok(())
    }

    /// Adaptive wait used by the interaction strategies
    pub fn wait_spec(&self) -> WaitSpec {
        WaitSpec::default()
            .with_timeout(Duration::from_millis(self.wait_timeout_ms))
            .with_polling(
                Duration::from_millis(self.wait_min_poll_ms),
                Duration::from_millis(self.wait_max_poll_ms),
            )
            .with_progressive(self.wait_progressive, self.wait_factor)
            .with_retry_attempts(self.wait_retry_attempts)
    }

    /// Overlay selectors as one selector list
    pub fn overlay_selector_list(&self) -> String {
        self.overlay_selectors
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn recovery_settle(&self) -> Duration {
        Duration::from_millis(self.recovery_settle_ms)
    }

    pub fn pointer_pause(&self) -> Duration {
        Duration::from_millis(self.pointer_pause_ms)
    }

    pub fn monitor_poll(&self) -> Duration {
        Duration::from_millis(self.monitor_poll_ms)
    }

    /// Tracing level named by `log_level`, INFO when unrecognized
    pub fn tracing_level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wait_timeout_ms, 10_000);
        assert_eq!(config.overlay_selector_list(), ".overlay, .modal, .dialog");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            settle_delay_ms = 50
            overlay_selectors = ".cookie-banner,.overlay"
            "#,
        )
        .unwrap();

        assert_eq!(config.settle_delay(), Duration::from_millis(50));
        assert_eq!(config.overlay_selector_list(), ".cookie-banner, .overlay");
        assert_eq!(config.retry_max_attempts, 3);
    }

    #[test]
    fn test_validate_rejects_shrinking_factor() {
        let config = Config {
            wait_factor: 0.5,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_tracing_level() {
        let config = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };
        assert_eq!(config.tracing_level(), Level::DEBUG);

        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert_eq!(config.tracing_level(), Level::INFO);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/flakeguard.toml");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
