//! Retry policies and the context-keyed policy table

use std::collections::HashMap;
use std::time::Duration;

use super::context::{BrowserState, NetworkCondition, RetryContext};

/// Retry budget: total attempts and the delay between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Exact-match mapping from [`RetryContext`] to [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: HashMap<RetryContext, RetryPolicy>,
    fallback: RetryPolicy,
}

impl PolicyTable {
    /// Table without entries; every lookup yields `fallback`
    pub fn empty(fallback: RetryPolicy) -> Self {
        Self {
            policies: HashMap::new(),
            fallback,
        }
    }

    /// Policy for `context`, or the fallback
    pub fn lookup(&self, context: &RetryContext) -> RetryPolicy {
        self.get(context).unwrap_or(self.fallback)
    }

    /// Policy mapped to exactly `context`
    pub fn get(&self, context: &RetryContext) -> Option<RetryPolicy> {
        self.policies.get(context).copied()
    }

    /// Add or replace the policy of a context
    pub fn insert(&mut self, context: RetryContext, policy: RetryPolicy) -> Option<RetryPolicy> {
        self.policies.insert(context, policy)
    }

    pub fn fallback(&self) -> RetryPolicy {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        let mut table = Self::empty(RetryPolicy::default());
        let entries = [
            (NetworkCondition::Good, BrowserState::Stable, 3, 500),
            (NetworkCondition::Poor, BrowserState::Stable, 5, 1_000),
            (NetworkCondition::Good, BrowserState::Unstable, 4, 750),
            (NetworkCondition::Poor, BrowserState::Unstable, 7, 1_500),
        ];
        for (network, browser, attempts, delay_ms) in entries {
            table.insert(
                RetryContext::new(network, browser),
                RetryPolicy::new(attempts, Duration::from_millis(delay_ms)),
            );
        }
        table
    }
}
