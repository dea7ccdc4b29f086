//! Context-aware retry loop

use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::context::{ContextProbe, RetryContext};
use super::policy::{PolicyTable, RetryPolicy};
use crate::error::Result;

/// Retries operations with a budget chosen from the observed context
#[derive(Debug)]
pub struct ContextAwareRetry {
    probe: Arc<dyn ContextProbe>,
    table: RwLock<PolicyTable>,
}

impl ContextAwareRetry {
    /// Create a retry executor with the default policy table
    pub fn new(probe: Arc<dyn ContextProbe>) -> Self {
        Self::with_table(probe, PolicyTable::default())
    }

    pub fn with_table(probe: Arc<dyn ContextProbe>, table: PolicyTable) -> Self {
        Self {
            probe,
            table: RwLock::new(table),
        }
    }

    /// Add or replace the policy used in `context`
    pub async fn add_policy(&self, context: RetryContext, policy: RetryPolicy) {
        debug!("Setting retry policy for {}: {:?}", context, policy);
        self.table.write().await.insert(context, policy);
    }

    /// Policy that applies in `context`
    pub async fn policy_for(&self, context: &RetryContext) -> RetryPolicy {
        self.table.read().await.lookup(context)
    }

    /// Run `action` until it succeeds or the policy budget is spent
    ///
    /// Programming errors are returned immediately. After every other failure
    /// the executor sleeps the current delay and samples the context again;
    /// a change to a context with a mapped policy switches to that policy for
    /// the remaining attempts. Returns the last failure on exhaustion.
    #[instrument(skip(self, action))]
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut action: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut context = self.probe.sample().await;
        let mut policy = self.policy_for(&context).await;
        debug!("Context {} selects {:?}", context, policy);

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let error = match action().await {
                Ok(value) => {
                    if attempts > 1 {
                        info!("'{}' succeeded on attempt {}", operation, attempts);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => {
                    warn!("'{}' failed with a non-retryable error: {}", operation, e);
                    return Err(e);
                }
                Err(e) => e,
            };
            debug!("'{}' attempt {} failed: {}", operation, attempts, error);

            tokio::time::sleep(policy.delay()).await;

            let observed = self.probe.sample().await;
            if observed != context {
                let mapped = self.table.read().await.get(&observed);
                if let Some(next) = mapped {
                    debug!("Context changed {} -> {}, switching to {:?}", context, observed, next);
                    policy = next;
                }
                context = observed;
            }

            if attempts >= policy.max_attempts() {
                warn!("'{}' gave up after {} attempts", operation, attempts);
                return Err(error);
            }
        }
    }
}
