//! Native strategy: driver primitives after an adaptive readiness wait

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{read_value, wait_ready, Attempt, InteractionStrategy, StrategyKind};
use crate::driver::{scripts, Driver, DriverResult, ElementRef};
use crate::wait::WaitSpec;

/// Native driver interaction strategy
#[derive(Debug, Clone)]
pub struct NativeStrategy {
    driver: Arc<dyn Driver>,
    wait: WaitSpec,
    settle: Duration,
}

impl NativeStrategy {
    pub fn new(driver: Arc<dyn Driver>, wait: WaitSpec, settle: Duration) -> Self {
        Self {
            driver,
            wait,
            settle,
        }
    }

    async fn prepare(&self, element: &ElementRef) -> DriverResult<()> {
        wait_ready(self.driver.as_ref(), &self.wait, element, true).await?;
        self.driver
            .execute_script(scripts::SCROLL_INTO_VIEW, vec![element.into()])
            .await?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    async fn try_click(&self, element: &ElementRef) -> DriverResult<()> {
        self.prepare(element).await?;
        self.driver.click(element).await
    }

    async fn try_replace(&self, element: &ElementRef, text: &str) -> DriverResult<String> {
        wait_ready(self.driver.as_ref(), &self.wait, element, true).await?;
        self.driver.clear(element).await?;
        if !text.is_empty() {
            self.driver.send_keys(element, text).await?;
        }
        read_value(self.driver.as_ref(), element).await
    }

    fn verified(&self, operation: &str, actual: DriverResult<String>, expected: &str) -> Attempt {
        match actual {
            Ok(value) if value == expected => Attempt::Succeeded,
            Ok(value) => {
                warn!(
                    "Native {} left value {:?}, expected {:?}",
                    operation, value, expected
                );
                Attempt::Failed(None)
            }
            Err(e) => {
                warn!("Native {} failed: {}", operation, e);
                Attempt::Failed(Some(e))
            }
        }
    }
}

#[async_trait]
impl InteractionStrategy for NativeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }

    async fn click(&self, element: &ElementRef) -> Attempt {
        debug!("Native click on {}", element);
        let result = self.try_click(element).await;
        if let Err(e) = &result {
            warn!("Native click failed: {}", e);
        }
        result.into()
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Attempt {
        debug!("Native type into {}", element);
        let actual = self.try_replace(element, text).await;
        self.verified("type", actual, text)
    }

    async fn clear(&self, element: &ElementRef) -> Attempt {
        debug!("Native clear of {}", element);
        let actual = self.try_replace(element, "").await;
        self.verified("clear", actual, "")
    }

    async fn is_displayed(&self, element: &ElementRef) -> bool {
        wait_ready(self.driver.as_ref(), &self.wait, element, false)
            .await
            .is_ok()
    }

    async fn is_enabled(&self, element: &ElementRef) -> bool {
        self.driver.is_enabled(element).await.unwrap_or(false)
    }
}
