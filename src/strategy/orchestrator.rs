//! Strategy orchestrator
//!
//! Tries strategies in their configured order and stops at the first success.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::native::NativeStrategy;
use super::pointer::PointerStrategy;
use super::script::ScriptStrategy;
use super::traits::{Attempt, Interaction, InteractionStrategy, StrategyKind};
use crate::config::Config;
use crate::driver::{Driver, DriverError, ElementRef};
use crate::error::{Error, Result, StrategyFailure};

/// Hook consulted when a strategy fails with a driver error
///
/// Returning a reference asks the orchestrator to retry the same strategy
/// once against it.
#[async_trait]
pub trait FailureRecovery: Send + Sync {
    async fn recover(&self, failure: &DriverError, element: &ElementRef) -> Option<ElementRef>;
}

/// Ordered, mutable list of interaction strategies
#[derive(Debug)]
pub struct StrategyOrchestrator {
    strategies: RwLock<Vec<Arc<dyn InteractionStrategy>>>,
}

impl StrategyOrchestrator {
    pub fn new(strategies: Vec<Arc<dyn InteractionStrategy>>) -> Self {
        Self {
            strategies: RwLock::new(strategies),
        }
    }

    /// Native, pointer, then script
    pub fn with_defaults(driver: Arc<dyn Driver>, config: &Config) -> Self {
        let wait = config.wait_spec();
        Self::new(vec![
            Arc::new(NativeStrategy::new(
                driver.clone(),
                wait.clone(),
                config.settle_delay(),
            )),
            Arc::new(PointerStrategy::new(
                driver.clone(),
                wait,
                config.pointer_pause(),
            )),
            Arc::new(ScriptStrategy::new(driver, config.settle_delay())),
        ])
    }

    /// Insert a strategy ahead of all others
    pub async fn add_strategy(&self, strategy: Arc<dyn InteractionStrategy>) {
        debug!("Adding strategy {} at the front", strategy.kind());
        self.strategies.write().await.insert(0, strategy);
    }

    /// Remove every strategy of the given kind
    pub async fn remove_strategy(&self, kind: StrategyKind) -> bool {
        let mut strategies = self.strategies.write().await;
        let before = strategies.len();
        strategies.retain(|s| s.kind() != kind);
        strategies.len() != before
    }

    /// Kinds in the current order
    pub async fn strategies(&self) -> Vec<StrategyKind> {
        self.strategies
            .read()
            .await
            .iter()
            .map(|s| s.kind())
            .collect()
    }

    async fn snapshot(&self) -> Vec<Arc<dyn InteractionStrategy>> {
        self.strategies.read().await.clone()
    }

    /// Carry out `interaction`, falling through strategies on failure
    #[instrument(skip(self, recovery), fields(operation = interaction.name()))]
    pub async fn perform(
        &self,
        interaction: Interaction<'_>,
        element: &ElementRef,
        recovery: Option<&dyn FailureRecovery>,
    ) -> Result<()> {
        let mut target = element.clone();
        let mut failures = Vec::new();

        for strategy in self.snapshot().await {
            let mut outcome = strategy.perform(interaction, &target).await;

            let cause = outcome.cause().cloned();
            if let (Some(cause), Some(recovery)) = (cause, recovery) {
                if let Some(recovered) = recovery.recover(&cause, &target).await {
                    debug!("Recovered from '{}', retrying {}", cause, strategy.kind());
                    target = recovered;
                    outcome = strategy.perform(interaction, &target).await;
                }
            }

            match outcome {
                Attempt::Succeeded => {
                    debug!("{} succeeded with {}", interaction.name(), strategy.kind());
                    return Ok(());
                }
                Attempt::Failed(cause) => failures.push(StrategyFailure {
                    strategy: strategy.kind(),
                    cause,
                }),
            }
        }

        warn!(
            "All {} strategies failed for {}",
            failures.len(),
            interaction.name()
        );
        Err(Error::StrategiesExhausted {
            operation: interaction.name().to_string(),
            failures,
        })
    }

    /// True if any strategy reports the element displayed
    pub async fn is_displayed(&self, element: &ElementRef) -> bool {
        for strategy in self.snapshot().await {
            if strategy.is_displayed(element).await {
                return true;
            }
        }
        false
    }

    /// True if any strategy reports the element enabled
    pub async fn is_enabled(&self, element: &ElementRef) -> bool {
        for strategy in self.snapshot().await {
            if strategy.is_enabled(element).await {
                return true;
            }
        }
        false
    }
}
