//! Runtime context inference

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::driver::{scripts, Driver, DriverResult};

/// Observed network health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkCondition {
    Good,
    Poor,
    Unknown,
}

/// Observed page health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserState {
    Stable,
    Unstable,
    Unknown,
}

/// Key of the retry policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetryContext {
    pub network: NetworkCondition,
    pub browser: BrowserState,
}

impl RetryContext {
    pub const fn new(network: NetworkCondition, browser: BrowserState) -> Self {
        Self { network, browser }
    }

    /// Context used when no signal is available
    pub const fn unknown() -> Self {
        Self::new(NetworkCondition::Unknown, BrowserState::Unknown)
    }
}

impl fmt::Display for RetryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.network, self.browser)
    }
}

/// Source of the current [`RetryContext`]
///
/// Sampling is best-effort and never fails: unavailable signals map to the
/// `Unknown` variants.
#[async_trait]
pub trait ContextProbe: Send + Sync + fmt::Debug {
    async fn sample(&self) -> RetryContext;
}

/// Probe reading navigation timing, page errors and heap usage via scripts
#[derive(Debug, Clone)]
pub struct ScriptContextProbe {
    driver: Arc<dyn Driver>,
    latency_threshold_ms: u64,
    heap_threshold_bytes: u64,
}

impl ScriptContextProbe {
    pub fn new(driver: Arc<dyn Driver>, latency_threshold_ms: u64, heap_threshold_bytes: u64) -> Self {
        Self {
            driver,
            latency_threshold_ms,
            heap_threshold_bytes,
        }
    }

    pub fn from_config(driver: Arc<dyn Driver>, config: &Config) -> Self {
        Self::new(
            driver,
            config.network_latency_threshold_ms,
            config.heap_unstable_bytes,
        )
    }

    async fn number(&self, script: &str) -> DriverResult<Option<f64>> {
        let value = self.driver.execute_script(script, vec![]).await?;
        Ok(match value {
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
    }

    async fn network(&self) -> NetworkCondition {
        match self.number(scripts::NAVIGATION_RESPONSE_TIME).await {
            Ok(Some(ms)) if ms > self.latency_threshold_ms as f64 => NetworkCondition::Poor,
            Ok(Some(_)) => NetworkCondition::Good,
            Ok(None) => NetworkCondition::Unknown,
            Err(e) => {
                debug!("Network condition unavailable: {}", e);
                NetworkCondition::Unknown
            }
        }
    }

    async fn browser(&self) -> BrowserState {
        let errors = match self.number(scripts::PAGE_ERROR_COUNT).await {
            Ok(count) => count.unwrap_or(0.0),
            Err(e) => {
                debug!("Page error count unavailable: {}", e);
                return BrowserState::Unknown;
            }
        };
        let heap = match self.number(scripts::JS_HEAP_USED).await {
            Ok(bytes) => bytes.unwrap_or(0.0),
            Err(e) => {
                debug!("Heap usage unavailable: {}", e);
                return BrowserState::Unknown;
            }
        };

        if errors > 0.0 || heap > self.heap_threshold_bytes as f64 {
            BrowserState::Unstable
        } else {
            BrowserState::Stable
        }
    }
}

#[async_trait]
impl ContextProbe for ScriptContextProbe {
    async fn sample(&self) -> RetryContext {
        RetryContext::new(self.network().await, self.browser().await)
    }
}
