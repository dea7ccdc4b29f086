//! Common test utilities
//!
//! Shared fixtures for the integration tests: a mock checkout page and a
//! retry-context probe that replays a scripted sequence.

use async_trait::async_trait;
use flakeguard::config::Config;
use flakeguard::driver::{MockDriver, MockElement};
use flakeguard::retry::{ContextProbe, RetryContext};
use flakeguard::SessionContext;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Checkout page with a cookie overlay over the pay button
pub async fn checkout_page() -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element(
            "cookie-banner",
            MockElement::new("div").with_class("modal cookie-consent"),
        )
        .await;
    driver
        .add_element(
            "card-number",
            MockElement::new("input")
                .with_id("card")
                .with_name("cardnumber")
                .with_max_length(19),
        )
        .await;
    driver
        .add_element(
            "pay",
            MockElement::new("button")
                .with_id("pay")
                .with_class("btn-legacy")
                .with_text("Pay now")
                .covered_by("cookie-banner"),
        )
        .await;
    driver
        .add_element(
            "receipt",
            MockElement::new("div").with_id("receipt").hidden(),
        )
        .await;
    driver
}

/// Session over `driver` with the default configuration
pub fn session(driver: &Arc<MockDriver>) -> Arc<SessionContext> {
    SessionContext::new(driver.clone(), Config::default())
}

/// Probe returning the given contexts in order, then repeating the last
#[derive(Debug)]
pub struct ScriptedProbe {
    contexts: Mutex<VecDeque<RetryContext>>,
}

impl ScriptedProbe {
    pub fn new(contexts: Vec<RetryContext>) -> Arc<Self> {
        Arc::new(Self {
            contexts: Mutex::new(contexts.into()),
        })
    }
}

#[async_trait]
impl ContextProbe for ScriptedProbe {
    async fn sample(&self) -> RetryContext {
        let mut contexts = match self.contexts.lock() {
            Ok(contexts) => contexts,
            Err(poisoned) => poisoned.into_inner(),
        };
        if contexts.len() > 1 {
            contexts.pop_front().unwrap_or_else(RetryContext::unknown)
        } else {
            contexts.front().copied().unwrap_or_else(RetryContext::unknown)
        }
    }
}
