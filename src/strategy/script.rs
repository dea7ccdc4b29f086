//! Script strategy: injected JavaScript

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{Attempt, InteractionStrategy, StrategyKind};
use crate::driver::{scripts, Driver, DriverError, DriverResult, ElementRef, ErrorKind};

/// Script-injection interaction strategy
#[derive(Debug, Clone)]
pub struct ScriptStrategy {
    driver: Arc<dyn Driver>,
    settle: Duration,
}

impl ScriptStrategy {
    pub fn new(driver: Arc<dyn Driver>, settle: Duration) -> Self {
        Self { driver, settle }
    }

    async fn run(&self, script: &str, element: &ElementRef) -> DriverResult<Value> {
        self.driver.execute_script(script, vec![element.into()]).await
    }

    async fn try_click(&self, element: &ElementRef) -> DriverResult<()> {
        self.run(scripts::SCROLL_INTO_VIEW, element).await?;
        tokio::time::sleep(self.settle).await;
        match self.run(scripts::CLICK, element).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::StaleElementReference => Err(e),
            Err(e) => {
                debug!("Script click raised ({}), dispatching a mouse event", e);
                self.run(scripts::DISPATCH_CLICK, element).await.map(|_| ())
            }
        }
    }

    async fn try_set(&self, element: &ElementRef, text: &str) -> DriverResult<String> {
        self.driver
            .execute_script(scripts::SET_VALUE, vec![element.into(), json!(text).into()])
            .await?;
        match self.run(scripts::GET_VALUE, element).await? {
            Value::String(value) => Ok(value),
            Value::Null => Ok(String::new()),
            other => Err(DriverError::Script(format!(
                "unexpected value type: {}",
                other
            ))),
        }
    }

    async fn check(&self, script: &str, element: &ElementRef) -> bool {
        match self.run(script, element).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Script state check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl InteractionStrategy for ScriptStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Script
    }

    async fn click(&self, element: &ElementRef) -> Attempt {
        debug!("Script click on {}", element);
        let result = self.try_click(element).await;
        if let Err(e) = &result {
            warn!("Script click failed: {}", e);
        }
        result.into()
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Attempt {
        debug!("Script type into {}", element);
        match self.try_set(element, text).await {
            Ok(value) if value == text => Attempt::Succeeded,
            Ok(value) => {
                warn!("Script type left value {:?}, expected {:?}", value, text);
                Attempt::Failed(None)
            }
            Err(e) => {
                warn!("Script type failed: {}", e);
                Attempt::Failed(Some(e))
            }
        }
    }

    async fn clear(&self, element: &ElementRef) -> Attempt {
        debug!("Script clear of {}", element);
        match self.try_set(element, "").await {
            Ok(value) if value.is_empty() => Attempt::Succeeded,
            Ok(value) => {
                warn!("Script clear left value {:?}", value);
                Attempt::Failed(None)
            }
            Err(e) => {
                warn!("Script clear failed: {}", e);
                Attempt::Failed(Some(e))
            }
        }
    }

    async fn is_displayed(&self, element: &ElementRef) -> bool {
        self.check(scripts::IS_VISIBLE, element).await
    }

    async fn is_enabled(&self, element: &ElementRef) -> bool {
        self.check(scripts::IS_ENABLED, element).await
    }
}
