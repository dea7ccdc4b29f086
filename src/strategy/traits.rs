//! Interaction strategy traits
//!
//! A strategy is one way of carrying out an interaction (driver primitives,
//! pointer action chains, injected scripts). Strategies never return errors:
//! failures are reported through [`Attempt`] and logged.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::driver::{Driver, DriverError, DriverResult, ElementRef, ErrorKind};
use crate::error::Error;
use crate::wait::{AdaptiveWait, WaitSpec};

/// Identifies a strategy in the orchestrator's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StrategyKind {
    Native,
    Pointer,
    Script,
    Custom(&'static str),
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Native => f.write_str("native"),
            StrategyKind::Pointer => f.write_str("pointer"),
            StrategyKind::Script => f.write_str("script"),
            StrategyKind::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

/// Outcome of one strategy attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Succeeded,
    /// Failed with the driver error observed, if any
    Failed(Option<DriverError>),
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        matches!(self, Attempt::Succeeded)
    }

    pub fn cause(&self) -> Option<&DriverError> {
        match self {
            Attempt::Failed(cause) => cause.as_ref(),
            Attempt::Succeeded => None,
        }
    }
}

impl From<DriverResult<()>> for Attempt {
    fn from(result: DriverResult<()>) -> Self {
        match result {
            Ok(()) => Attempt::Succeeded,
            Err(e) => Attempt::Failed(Some(e)),
        }
    }
}

/// Mutating interaction dispatched through the strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction<'a> {
    Click,
    Type(&'a str),
    Clear,
}

impl Interaction<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Click => "click",
            Interaction::Type(_) => "type",
            Interaction::Clear => "clear",
        }
    }
}

/// Element interaction strategy
#[async_trait]
pub trait InteractionStrategy: Send + Sync + fmt::Debug {
    fn kind(&self) -> StrategyKind;

    async fn click(&self, element: &ElementRef) -> Attempt;

    /// Replace the element's value and verify it reads back as `text`
    async fn type_text(&self, element: &ElementRef, text: &str) -> Attempt;

    /// Empty the element's value and verify it reads back empty
    async fn clear(&self, element: &ElementRef) -> Attempt;

    async fn is_displayed(&self, element: &ElementRef) -> bool;

    async fn is_enabled(&self, element: &ElementRef) -> bool;

    async fn perform(&self, interaction: Interaction<'_>, element: &ElementRef) -> Attempt {
        match interaction {
            Interaction::Click => self.click(element).await,
            Interaction::Type(text) => self.type_text(element, text).await,
            Interaction::Clear => self.clear(element).await,
        }
    }
}

/// Driver error carried by a wait or driver failure
pub(crate) fn driver_cause(error: &Error) -> Option<DriverError> {
    match error {
        Error::Driver(e) => Some(e.clone()),
        Error::Timeout {
            last_cause: Some(cause),
            ..
        } => driver_cause(cause),
        _ => None,
    }
}

/// Wait until the element is displayed (and enabled, if asked)
///
/// A stale reference surfaces as such; any other unmet wait is reported as
/// not interactable.
pub(crate) async fn wait_ready(
    driver: &dyn Driver,
    spec: &WaitSpec,
    element: &ElementRef,
    need_enabled: bool,
) -> DriverResult<()> {
    let outcome = AdaptiveWait::new(spec.clone())
        .until_true("interactable", || async move {
            let shown = driver.is_displayed(element).await?;
            Ok::<_, Error>(shown && (!need_enabled || driver.is_enabled(element).await?))
        })
        .await;

    outcome.map_err(|e| match driver_cause(&e) {
        Some(cause) if cause.kind() == ErrorKind::StaleElementReference => cause,
        _ => DriverError::ElementNotInteractable(format!("{} not ready: {}", element, e)),
    })
}

/// Read the element's value, treating a missing attribute as empty
pub(crate) async fn read_value(driver: &dyn Driver, element: &ElementRef) -> DriverResult<String> {
    Ok(driver
        .get_attribute(element, "value")
        .await?
        .unwrap_or_default())
}
