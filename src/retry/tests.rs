//! Context-aware retry tests

use super::*;
use crate::driver::{DriverError, MockDriver, MockOp};
use crate::Error;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const GOOD: RetryContext = RetryContext::new(NetworkCondition::Good, BrowserState::Stable);
const POOR: RetryContext = RetryContext::new(NetworkCondition::Poor, BrowserState::Stable);

/// Probe replaying a sequence of contexts, repeating the last one
#[derive(Debug)]
struct ScriptedProbe {
    contexts: Mutex<VecDeque<RetryContext>>,
    samples: AtomicU32,
}

impl ScriptedProbe {
    fn new(contexts: Vec<RetryContext>) -> Arc<Self> {
        Arc::new(Self {
            contexts: Mutex::new(contexts.into()),
            samples: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl ContextProbe for ScriptedProbe {
    async fn sample(&self) -> RetryContext {
        self.samples.fetch_add(1, Ordering::SeqCst);
        let mut contexts = self.contexts.lock().unwrap();
        if contexts.len() > 1 {
            contexts.pop_front().unwrap_or_else(RetryContext::unknown)
        } else {
            contexts.front().copied().unwrap_or_else(RetryContext::unknown)
        }
    }
}

fn stale() -> Error {
    Error::Driver(DriverError::StaleElementReference("gone".into()))
}

#[test]
fn test_default_table() {
    let table = PolicyTable::default();
    assert_eq!(table.len(), 4);
    assert_eq!(
        table.lookup(&GOOD),
        RetryPolicy::new(3, Duration::from_millis(500))
    );
    assert_eq!(
        table.lookup(&POOR),
        RetryPolicy::new(5, Duration::from_millis(1_000))
    );
    assert_eq!(
        table.lookup(&RetryContext::new(NetworkCondition::Poor, BrowserState::Unstable)),
        RetryPolicy::new(7, Duration::from_millis(1_500))
    );
    assert_eq!(table.lookup(&RetryContext::unknown()), RetryPolicy::default());
    assert!(table.get(&RetryContext::unknown()).is_none());
}

#[test]
fn test_policy_needs_one_attempt() {
    assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_switches_policy_when_context_changes() {
    let probe = ScriptedProbe::new(vec![GOOD, POOR]);
    let retry = ContextAwareRetry::new(probe.clone());
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result: crate::Result<()> = retry
        .execute("click", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(stale()) }
        })
        .await;

    assert!(matches!(result, Err(Error::Driver(_))));
    // one attempt under GOOD, the remaining four under POOR
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(started.elapsed(), Duration::from_millis(500 + 4 * 1_000));
    assert_eq!(probe.samples.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_unmapped_context_keeps_current_policy() {
    let probe = ScriptedProbe::new(vec![POOR, RetryContext::unknown()]);
    let retry = ContextAwareRetry::new(probe);
    let calls = AtomicU32::new(0);

    let result: crate::Result<()> = retry
        .execute("type", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(stale()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_programming_error_is_not_retried() {
    let retry = ContextAwareRetry::new(ScriptedProbe::new(vec![GOOD]));
    let calls = AtomicU32::new(0);
    let started = Instant::now();

    let result: crate::Result<()> = retry
        .execute("submit", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::invalid_argument("bad locator")) }
        })
        .await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_transient_failures() {
    let retry = ContextAwareRetry::new(ScriptedProbe::new(vec![GOOD]));
    let calls = AtomicU32::new(0);

    let value = retry
        .execute("read", || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(stale())
                } else {
                    Ok(call)
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 3);
}

#[tokio::test(start_paused = true)]
async fn test_add_policy_extends_table() {
    let retry = ContextAwareRetry::new(ScriptedProbe::new(vec![RetryContext::unknown()]));
    assert_eq!(
        retry.policy_for(&RetryContext::unknown()).await,
        RetryPolicy::default()
    );

    retry
        .add_policy(
            RetryContext::unknown(),
            RetryPolicy::new(2, Duration::from_millis(100)),
        )
        .await;

    let calls = AtomicU32::new(0);
    let started = Instant::now();
    let result: crate::Result<()> = retry
        .execute("clear", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(stale()) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(started.elapsed(), Duration::from_millis(200));
}

#[tokio::test]
async fn test_script_probe_signals() {
    let driver = Arc::new(MockDriver::new());
    let probe = ScriptContextProbe::new(driver.clone(), 1_000, 100_000_000);

    // no navigation timing yet
    assert_eq!(
        probe.sample().await,
        RetryContext::new(NetworkCondition::Unknown, BrowserState::Stable)
    );

    driver.set_response_time(Some(1_500)).await;
    assert_eq!(probe.sample().await.network, NetworkCondition::Poor);

    driver.set_response_time(Some(200)).await;
    assert_eq!(probe.sample().await, GOOD);

    driver.set_page_errors(2).await;
    assert_eq!(probe.sample().await.browser, BrowserState::Unstable);

    driver.set_page_errors(0).await;
    driver.set_heap_used(150_000_000).await;
    assert_eq!(probe.sample().await.browser, BrowserState::Unstable);
}

#[tokio::test]
async fn test_script_probe_degrades_to_unknown() {
    let driver = Arc::new(MockDriver::new());
    driver.set_response_time(Some(100)).await;
    driver
        .fail_next(
            None,
            MockOp::Script,
            DriverError::Session("browser went away".into()),
            3,
        )
        .await;

    let probe = ScriptContextProbe::new(driver, 1_000, 100_000_000);
    assert_eq!(probe.sample().await, RetryContext::unknown());
}
