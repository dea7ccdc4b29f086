//! Pointer strategy: pointer and keyboard action chains

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{read_value, wait_ready, Attempt, InteractionStrategy, StrategyKind};
use crate::driver::{scripts, Driver, DriverResult, ElementRef, Key, PointerAction};
use crate::wait::WaitSpec;

/// Offset used when a centered press does not land
const FALLBACK_OFFSET: (i32, i32) = (1, 1);

/// Pointer-simulation interaction strategy
#[derive(Debug, Clone)]
pub struct PointerStrategy {
    driver: Arc<dyn Driver>,
    wait: WaitSpec,
    pause: Duration,
}

impl PointerStrategy {
    pub fn new(driver: Arc<dyn Driver>, wait: WaitSpec, pause: Duration) -> Self {
        Self {
            driver,
            wait,
            pause,
        }
    }

    fn press(&self, element: &ElementRef, offset: Option<(i32, i32)>) -> Vec<PointerAction> {
        vec![
            PointerAction::MoveTo {
                element: element.clone(),
                offset,
            },
            PointerAction::Pause(self.pause.as_millis() as u64),
            PointerAction::Down,
            PointerAction::Up,
        ]
    }

    fn select_all_and_delete(&self, element: &ElementRef) -> Vec<PointerAction> {
        let mut chain = self.press(element, None);
        chain.extend([
            PointerAction::KeyDown(Key::Control),
            PointerAction::SendKeys("a".to_string()),
            PointerAction::KeyUp(Key::Control),
            PointerAction::Press(Key::Delete),
        ]);
        chain
    }

    async fn try_click(&self, element: &ElementRef) -> DriverResult<()> {
        wait_ready(self.driver.as_ref(), &self.wait, element, true).await?;
        match self.driver.perform_actions(&self.press(element, None)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("Centered press failed ({}), retrying with offset", e);
                self.driver
                    .perform_actions(&self.press(element, Some(FALLBACK_OFFSET)))
                    .await
            }
        }
    }

    async fn try_replace(&self, element: &ElementRef, text: &str) -> DriverResult<String> {
        wait_ready(self.driver.as_ref(), &self.wait, element, true).await?;
        let mut chain = self.select_all_and_delete(element);
        if !text.is_empty() {
            chain.push(PointerAction::SendKeys(text.to_string()));
        }
        self.driver.perform_actions(&chain).await?;
        read_value(self.driver.as_ref(), element).await
    }

    async fn within_viewport(&self, element: &ElementRef) -> DriverResult<bool> {
        self.driver
            .perform_actions(&[PointerAction::MoveTo {
                element: element.clone(),
                offset: None,
            }])
            .await?;
        let rect = self.driver.rect(element).await?;
        if !rect.has_area() {
            return Ok(false);
        }

        let viewport = self
            .driver
            .execute_script(scripts::VIEWPORT_SIZE, vec![])
            .await?;
        let dimension = |name: &str| viewport.get(name).and_then(Value::as_f64);
        let (x, y) = rect.center();
        Ok(match (dimension("width"), dimension("height")) {
            (Some(width), Some(height)) => x >= 0.0 && y >= 0.0 && x <= width && y <= height,
            _ => true,
        })
    }
}

#[async_trait]
impl InteractionStrategy for PointerStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pointer
    }

    async fn click(&self, element: &ElementRef) -> Attempt {
        debug!("Pointer click on {}", element);
        let result = self.try_click(element).await;
        if let Err(e) = &result {
            warn!("Pointer click failed: {}", e);
        }
        result.into()
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Attempt {
        debug!("Pointer type into {}", element);
        match self.try_replace(element, text).await {
            Ok(value) if value == text => Attempt::Succeeded,
            Ok(value) => {
                warn!("Pointer type left value {:?}, expected {:?}", value, text);
                Attempt::Failed(None)
            }
            Err(e) => {
                warn!("Pointer type failed: {}", e);
                Attempt::Failed(Some(e))
            }
        }
    }

    async fn clear(&self, element: &ElementRef) -> Attempt {
        debug!("Pointer clear of {}", element);
        match self.try_replace(element, "").await {
            Ok(value) if value.is_empty() => Attempt::Succeeded,
            Ok(value) => {
                warn!("Pointer clear left value {:?}", value);
                Attempt::Failed(None)
            }
            Err(e) => {
                warn!("Pointer clear failed: {}", e);
                Attempt::Failed(Some(e))
            }
        }
    }

    async fn is_displayed(&self, element: &ElementRef) -> bool {
        match self.within_viewport(element).await {
            Ok(visible) => visible,
            Err(e) => {
                debug!("Pointer visibility check failed: {}", e);
                false
            }
        }
    }

    /// Enabled state cannot be observed through pointer simulation
    async fn is_enabled(&self, _element: &ElementRef) -> bool {
        false
    }
}
