//! Element state validator
//!
//! Boolean state checks backed by an adaptive wait. A check that does not
//! hold within the wait budget reports `false`.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::adaptive::{AdaptiveWait, WaitSpec};
use super::conditions;
use crate::driver::{Driver, ElementRef};

/// Validates the state of one element
#[derive(Debug, Clone)]
pub struct ElementStateValidator {
    driver: Arc<dyn Driver>,
    element: ElementRef,
    spec: WaitSpec,
}

impl ElementStateValidator {
    pub fn new(driver: Arc<dyn Driver>, element: ElementRef, spec: WaitSpec) -> Self {
        Self {
            driver,
            element,
            spec,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.spec = self.spec.with_timeout(timeout);
        self
    }

    pub fn with_polling(mut self, min_poll: Duration, max_poll: Duration) -> Self {
        self.spec = self.spec.with_polling(min_poll, max_poll);
        self
    }

    pub fn with_progressive_polling(mut self, factor: f64) -> Self {
        self.spec = self.spec.with_progressive(true, factor);
        self
    }

    pub fn with_retries(mut self, attempts: u32) -> Self {
        self.spec = self.spec.with_retry_attempts(attempts);
        self
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn spec(&self) -> &WaitSpec {
        &self.spec
    }

    async fn holds<F, Fut>(&self, what: &str, check: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = crate::Result<bool>>,
    {
        match AdaptiveWait::new(self.spec.clone()).until_true(what, check).await {
            Ok(()) => true,
            Err(e) => {
                debug!("{} is not {}: {}", self.element, what, e);
                false
            }
        }
    }

    pub async fn is_displayed(&self) -> bool {
        let driver = self.driver.as_ref();
        let element = &self.element;
        self.holds("displayed", || conditions::element_displayed(driver, element))
            .await
    }

    pub async fn is_clickable(&self) -> bool {
        let driver = self.driver.as_ref();
        let element = &self.element;
        self.holds("clickable", || conditions::element_clickable(driver, element))
            .await
    }

    pub async fn has_text(&self, expected: &str) -> bool {
        let driver = self.driver.as_ref();
        let element = &self.element;
        self.holds("showing the expected text", || {
            conditions::element_has_text(driver, element, expected)
        })
        .await
    }

    pub async fn contains_text(&self, fragment: &str) -> bool {
        let driver = self.driver.as_ref();
        let element = &self.element;
        self.holds("containing the expected text", || {
            conditions::element_contains_text(driver, element, fragment)
        })
        .await
    }

    pub async fn has_value(&self, expected: &str) -> bool {
        let driver = self.driver.as_ref();
        let element = &self.element;
        self.holds("holding the expected value", || {
            conditions::element_has_value(driver, element, expected)
        })
        .await
    }
}
