//! Runtime-tunable configuration store
//!
//! Values live in a concurrent map keyed by dotted names. Named rules inspect
//! live metrics and rewrite values; [`ConfigStore::adjust`] runs all of them.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::Config;

/// Well-known configuration keys
pub mod keys {
    pub const IMPLICIT_WAIT: &str = "implicit.wait";
    pub const EXPLICIT_WAIT: &str = "explicit.wait";
    pub const PAGE_LOAD_TIMEOUT: &str = "page.load.timeout";
    pub const SCRIPT_TIMEOUT: &str = "script.timeout";
    pub const POLLING_INTERVAL: &str = "polling.interval";
    pub const POLLING_MAX_INTERVAL: &str = "polling.max.interval";
    pub const RETRY_MAX_ATTEMPTS: &str = "retry.max.attempts";
    pub const RETRY_BACKOFF_MULTIPLIER: &str = "retry.backoff.multiplier";
    pub const NETWORK_LATENCY_THRESHOLD: &str = "network.latency.threshold";
    pub const MEMORY_USAGE_THRESHOLD: &str = "memory.usage.threshold";
    pub const CPU_USAGE_THRESHOLD: &str = "cpu.usage.threshold";
    pub const DEFAULT_TIMEOUT: &str = "default.timeout";
    pub const OVERLAY_SELECTORS: &str = "overlay.selectors";
}

/// Metric names understood by the built-in rules
pub mod metrics {
    /// Observed network latency in milliseconds
    pub const NETWORK_LATENCY: &str = "network.latency";
    /// Observed CPU usage in percent
    pub const CPU_USAGE: &str = "cpu.usage";
}

/// Name of the built-in timeout rule
pub const TIMEOUT_RULE: &str = "dynamic.timeout.rule";
/// Name of the built-in polling rule
pub const POLLING_RULE: &str = "dynamic.polling.rule";

const MAX_EXPLICIT_WAIT: Duration = Duration::from_secs(60);
const MAX_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Typed configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Duration(#[serde(with = "duration_ms")] Duration),
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

/// Rule adjusting the store from live metrics
pub type ConfigRule = Arc<dyn Fn(&ConfigStore, &HashMap<String, f64>) + Send + Sync>;

/// Runtime configuration store
pub struct ConfigStore {
    values: DashMap<String, ConfigValue>,
    rules: DashMap<String, ConfigRule>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("values", &self.values.len())
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ConfigStore {
    /// Create an empty store without rules
    pub fn empty() -> Self {
        Self {
            values: DashMap::new(),
            rules: DashMap::new(),
        }
    }

    /// Create a store seeded from `config` with the built-in rules installed
    pub fn from_config(config: &Config) -> Self {
        let store = Self::empty();
        let ms = Duration::from_millis;

        store.set(keys::IMPLICIT_WAIT, ConfigValue::Duration(ms(config.implicit_wait_ms)));
        store.set(keys::EXPLICIT_WAIT, ConfigValue::Duration(ms(config.explicit_wait_ms)));
        store.set(
            keys::PAGE_LOAD_TIMEOUT,
            ConfigValue::Duration(ms(config.page_load_timeout_ms)),
        );
        store.set(keys::SCRIPT_TIMEOUT, ConfigValue::Duration(ms(config.script_timeout_ms)));
        store.set(
            keys::POLLING_INTERVAL,
            ConfigValue::Duration(ms(config.polling_interval_ms)),
        );
        store.set(
            keys::POLLING_MAX_INTERVAL,
            ConfigValue::Duration(ms(config.polling_max_interval_ms)),
        );
        store.set(
            keys::RETRY_MAX_ATTEMPTS,
            ConfigValue::Integer(config.retry_max_attempts as i64),
        );
        store.set(
            keys::RETRY_BACKOFF_MULTIPLIER,
            ConfigValue::Float(config.retry_backoff_multiplier),
        );
        store.set(
            keys::NETWORK_LATENCY_THRESHOLD,
            ConfigValue::Integer(config.network_latency_threshold_ms as i64),
        );
        store.set(
            keys::MEMORY_USAGE_THRESHOLD,
            ConfigValue::Integer(config.memory_usage_threshold as i64),
        );
        store.set(keys::CPU_USAGE_THRESHOLD, ConfigValue::Float(config.cpu_usage_threshold));
        store.set(
            keys::DEFAULT_TIMEOUT,
            ConfigValue::Integer(config.default_timeout_secs as i64),
        );
        store.set(
            keys::OVERLAY_SELECTORS,
            ConfigValue::Text(config.overlay_selector_list()),
        );

        store.add_rule(TIMEOUT_RULE, timeout_rule);
        store.add_rule(POLLING_RULE, polling_rule);
        store
    }

    /// Set a value, replacing any previous one
    pub fn set<K: Into<String>>(&self, key: K, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).map(|v| v.value().clone())
    }

    /// Remove a value
    pub fn remove(&self, key: &str) -> Option<ConfigValue> {
        self.values.remove(key).map(|(_, v)| v)
    }

    pub fn get_duration(&self, key: &str) -> Option<Duration> {
        match self.get(key)? {
            ConfigValue::Duration(d) => Some(d),
            ConfigValue::Integer(ms) if ms >= 0 => Some(Duration::from_millis(ms as u64)),
            _ => None,
        }
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            ConfigValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            ConfigValue::Float(f) => Some(f),
            ConfigValue::Integer(i) => Some(i as f64),
            _ => None,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            ConfigValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Duration value with a fallback
    pub fn duration_or(&self, key: &str, fallback: Duration) -> Duration {
        self.get_duration(key).unwrap_or(fallback)
    }

    /// Register or replace a named rule
    pub fn add_rule<K, F>(&self, name: K, rule: F)
    where
        K: Into<String>,
        F: Fn(&ConfigStore, &HashMap<String, f64>) + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("Registering config rule: {}", name);
        self.rules.insert(name, Arc::new(rule));
    }

    /// Remove a named rule
    pub fn remove_rule(&self, name: &str) -> bool {
        self.rules.remove(name).is_some()
    }

    /// Names of registered rules, sorted
    pub fn rule_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Evaluate every rule against the given metrics
    pub fn adjust(&self, metrics: &HashMap<String, f64>) {
        let rules: Vec<(String, ConfigRule)> = self
            .rules
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();

        for (name, rule) in rules {
            debug!("Applying config rule: {}", name);
            rule(self, metrics);
        }
    }

    /// Sorted copy of all values
    pub fn snapshot(&self) -> BTreeMap<String, ConfigValue> {
        self.values
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

fn doubled_capped(current: Duration, cap: Duration) -> Duration {
    current.saturating_mul(2).min(cap)
}

fn timeout_rule(store: &ConfigStore, observed: &HashMap<String, f64>) {
    let latency = match observed.get(metrics::NETWORK_LATENCY) {
        Some(l) => *l,
        None => return,
    };
    let threshold = store
        .get_float(keys::NETWORK_LATENCY_THRESHOLD)
        .unwrap_or(1_000.0);
    if latency <= threshold {
        return;
    }

    if let Some(wait) = store.get_duration(keys::EXPLICIT_WAIT) {
        let adjusted = doubled_capped(wait, MAX_EXPLICIT_WAIT);
        store.set(keys::EXPLICIT_WAIT, ConfigValue::Duration(adjusted));
        info!("High latency {}ms: explicit wait -> {:?}", latency, adjusted);
    }
    if let Some(load) = store.get_duration(keys::PAGE_LOAD_TIMEOUT) {
        let adjusted = doubled_capped(load, MAX_PAGE_LOAD_TIMEOUT);
        store.set(keys::PAGE_LOAD_TIMEOUT, ConfigValue::Duration(adjusted));
    }
}

fn polling_rule(store: &ConfigStore, observed: &HashMap<String, f64>) {
    let cpu = match observed.get(metrics::CPU_USAGE) {
        Some(c) => *c,
        None => return,
    };
    let threshold = store.get_float(keys::CPU_USAGE_THRESHOLD).unwrap_or(70.0);
    if cpu <= threshold {
        return;
    }

    if let (Some(interval), Some(max)) = (
        store.get_duration(keys::POLLING_INTERVAL),
        store.get_duration(keys::POLLING_MAX_INTERVAL),
    ) {
        let adjusted = doubled_capped(interval, max);
        store.set(keys::POLLING_INTERVAL, ConfigValue::Duration(adjusted));
        info!("High CPU {}%: polling interval -> {:?}", cpu, adjusted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_seeded_from_config() {
        let store = ConfigStore::default();
        assert_eq!(
            store.get_duration(keys::EXPLICIT_WAIT),
            Some(Duration::from_secs(20))
        );
        assert_eq!(store.get_integer(keys::RETRY_MAX_ATTEMPTS), Some(3));
        assert_eq!(store.get_float(keys::RETRY_BACKOFF_MULTIPLIER), Some(1.5));
        assert_eq!(
            store.rule_names(),
            vec![POLLING_RULE.to_string(), TIMEOUT_RULE.to_string()]
        );
    }

    #[test]
    fn test_timeout_rule_doubles_and_caps() {
        let store = ConfigStore::default();
        let slow = observed(&[(metrics::NETWORK_LATENCY, 1_500.0)]);

        store.adjust(&slow);
        assert_eq!(store.get_duration(keys::EXPLICIT_WAIT), Some(Duration::from_secs(40)));
        assert_eq!(
            store.get_duration(keys::PAGE_LOAD_TIMEOUT),
            Some(Duration::from_secs(60))
        );

        store.adjust(&slow);
        store.adjust(&slow);
        assert_eq!(store.get_duration(keys::EXPLICIT_WAIT), Some(Duration::from_secs(60)));
        assert_eq!(
            store.get_duration(keys::PAGE_LOAD_TIMEOUT),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_timeout_rule_ignores_fast_network() {
        let store = ConfigStore::default();
        store.adjust(&observed(&[(metrics::NETWORK_LATENCY, 200.0)]));
        assert_eq!(store.get_duration(keys::EXPLICIT_WAIT), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_polling_rule_caps_at_max_interval() {
        let store = ConfigStore::default();
        let busy = observed(&[(metrics::CPU_USAGE, 85.0)]);

        store.adjust(&busy);
        assert_eq!(
            store.get_duration(keys::POLLING_INTERVAL),
            Some(Duration::from_millis(1_000))
        );
        store.adjust(&busy);
        store.adjust(&busy);
        assert_eq!(
            store.get_duration(keys::POLLING_INTERVAL),
            Some(Duration::from_millis(2_000))
        );
    }

    #[test]
    fn test_custom_rule_and_removal() {
        let store = ConfigStore::empty();
        store.add_rule("flag", |s: &ConfigStore, m: &HashMap<String, f64>| {
            s.set("seen", ConfigValue::Bool(m.contains_key("x")));
        });

        store.adjust(&observed(&[("x", 1.0)]));
        assert_eq!(store.get_bool("seen"), Some(true));

        assert!(store.remove_rule("flag"));
        store.set("seen", ConfigValue::Bool(false));
        store.adjust(&observed(&[("x", 1.0)]));
        assert_eq!(store.get_bool("seen"), Some(false));
    }

    #[test]
    fn test_snapshot_serializes_durations_as_millis() {
        let store = ConfigStore::empty();
        store.set("a", ConfigValue::Duration(Duration::from_millis(1500)));
        store.set("b", ConfigValue::Text("x".into()));

        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json, serde_json::json!({ "a": 1500, "b": "x" }));
    }
}
