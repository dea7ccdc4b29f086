//! Resilient element façade
//!
//! Composes locator healing, interaction strategies, recovery, context-aware
//! retry and monitoring behind one element API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::config::{store::keys, ConfigStore};
use crate::driver::{Driver, DriverError, DriverResult, ElementRef, ErrorKind, Locator, Rect};
use crate::error::{Error, Result};
use crate::locator::SelfHealingLocator;
use crate::monitor::{ElementSource, NetworkEntry, WatchHandle, WatchedState};
use crate::recovery::RecoveryRegistry;
use crate::retry::{ContextAwareRetry, RetryContext, RetryPolicy};
use crate::session::SessionContext;
use crate::strategy::{FailureRecovery, Interaction, StrategyOrchestrator};
use crate::wait::ElementStateValidator;

/// Connects the orchestrator's failure hook to the recovery registry
///
/// A successful remedy hands back the locator's current reference, which is
/// fresh after a stale-reference recovery.
#[derive(Debug, Clone)]
struct RecoveryBridge {
    registry: Arc<RecoveryRegistry>,
    locator: Arc<SelfHealingLocator>,
}

#[async_trait]
impl FailureRecovery for RecoveryBridge {
    async fn recover(&self, failure: &DriverError, element: &ElementRef) -> Option<ElementRef> {
        if !self.registry.attempt(failure, element).await {
            return None;
        }
        Some(self.locator.current().await.unwrap_or_else(|| element.clone()))
    }
}

/// Element handle that heals, retries and recovers on its own
#[derive(Debug)]
pub struct ResilientElement {
    session: Arc<SessionContext>,
    locator: Arc<SelfHealingLocator>,
    orchestrator: StrategyOrchestrator,
    recovery: Arc<RecoveryRegistry>,
    retry: ContextAwareRetry,
    bridge: RecoveryBridge,
}

impl ResilientElement {
    /// Create an element resolved through `locators`, in preference order
    pub fn new<S: Into<String>>(
        session: Arc<SessionContext>,
        key: S,
        locators: Vec<Locator>,
    ) -> Result<Self> {
        let driver = session.driver();
        let config = session.config();
        let store = session.store();

        let locator = Arc::new(SelfHealingLocator::new(key, driver.clone(), locators)?);
        let overlays = store
            .get_text(keys::OVERLAY_SELECTORS)
            .unwrap_or_else(|| config.overlay_selector_list());
        let recovery = Arc::new(RecoveryRegistry::with_defaults(
            driver.clone(),
            locator.clone(),
            overlays,
            config.recovery_settle(),
        ));
        let orchestrator = StrategyOrchestrator::with_defaults(driver, config);
        let retry = ContextAwareRetry::new(session.probe());
        let bridge = RecoveryBridge {
            registry: recovery.clone(),
            locator: locator.clone(),
        };

        debug!("Created resilient element '{}'", locator.key());
        Ok(Self {
            session,
            locator,
            orchestrator,
            recovery,
            retry,
            bridge,
        })
    }

    pub fn key(&self) -> &str {
        self.locator.key()
    }

    pub fn locator(&self) -> &Arc<SelfHealingLocator> {
        &self.locator
    }

    /// Strategy list used for click, type and clear
    pub fn strategies(&self) -> &StrategyOrchestrator {
        &self.orchestrator
    }

    /// Runtime configuration store of the session
    pub fn config(&self) -> Arc<ConfigStore> {
        self.session.store()
    }

    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn click(&self) -> Result<()> {
        self.act(Interaction::Click).await
    }

    /// Replace the element's value with `text`
    #[instrument(skip(self, text), fields(key = %self.key()))]
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.act(Interaction::Type(text)).await
    }

    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn clear(&self) -> Result<()> {
        self.act(Interaction::Clear).await
    }

    #[instrument(skip(self), fields(key = %self.key()))]
    pub async fn submit(&self) -> Result<()> {
        self.direct("submit", |driver, element| async move { driver.submit(&element).await })
            .await
    }

    pub async fn get_text(&self) -> Result<String> {
        self.direct("get_text", |driver, element| async move {
            driver.get_text(&element).await
        })
        .await
    }

    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        let name = name.to_string();
        self.direct("get_attribute", move |driver, element| {
            let name = name.clone();
            async move { driver.get_attribute(&element, &name).await }
        })
        .await
    }

    pub async fn get_tag_name(&self) -> Result<String> {
        self.direct("get_tag_name", |driver, element| async move {
            driver.get_tag_name(&element).await
        })
        .await
    }

    pub async fn is_selected(&self) -> Result<bool> {
        self.direct("is_selected", |driver, element| async move {
            driver.is_selected(&element).await
        })
        .await
    }

    /// Whether any strategy sees the element displayed; `false` on failure
    pub async fn is_displayed(&self) -> bool {
        let this = self;
        let outcome = self
            .session
            .performance()
            .time(
                self.key(),
                "is_displayed",
                self.retry.execute("is_displayed", move || {
                    this.query(move |element| async move {
                        this.orchestrator.is_displayed(&element).await
                    })
                }),
            )
            .await;

        outcome.unwrap_or_else(|e| {
            debug!("is_displayed of '{}' degraded to false: {}", self.key(), e);
            false
        })
    }

    /// Whether any strategy sees the element enabled; `false` on failure
    pub async fn is_enabled(&self) -> bool {
        let this = self;
        let check = self.query(move |element| async move {
            this.orchestrator.is_enabled(&element).await
        });
        let outcome = self
            .session
            .performance()
            .time(self.key(), "is_enabled", check)
            .await;

        outcome.unwrap_or_else(|e| {
            debug!("is_enabled of '{}' degraded to false: {}", self.key(), e);
            false
        })
    }

    /// Bounding box of the element
    pub async fn get_rect(&self) -> Result<Rect> {
        self.direct("get_rect", |driver, element| async move { driver.rect(&element).await })
            .await
    }

    /// Every element matched by any candidate locator
    ///
    /// Matches are not de-duplicated.
    pub async fn find_all(&self) -> Result<Vec<ElementRef>> {
        let locator = &self.locator;
        self.session
            .performance()
            .time(
                self.key(),
                "find_all",
                self.retry
                    .execute("find_all", move || async move { locator.resolve_all().await }),
            )
            .await
    }

    /// PNG screenshot of the current viewport
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let driver = self.session.driver();
        let capture = async move { driver.screenshot().await.map_err(Error::from) };
        self.session
            .performance()
            .time(self.key(), "screenshot", capture)
            .await
    }

    /// Register (or replace) the remedy for a driver error kind
    pub async fn add_recovery_strategy<F, Fut>(&self, kind: ErrorKind, remedy: F)
    where
        F: Fn(Arc<dyn Driver>, ElementRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.recovery.add(kind, remedy).await;
    }

    /// Retry policy to apply in `context`
    pub async fn add_retry_policy(&self, context: RetryContext, policy: RetryPolicy) {
        self.retry.add_policy(context, policy).await;
    }

    pub async fn add_alternative_locator(&self, locator: Locator) -> bool {
        self.locator.add_alternative_locator(locator).await
    }

    /// Call `callback` once the element enters `state`
    ///
    /// `state` is one of `visible`, `enabled` or `selected`.
    pub fn wait_for_state<F>(&self, state: &str, callback: F) -> Result<WatchHandle>
    where
        F: FnOnce(ElementRef) + Send + 'static,
    {
        let state: WatchedState = state.parse()?;
        let source: Arc<dyn ElementSource> = self.locator.clone();
        Ok(self.session.events().on_state_change(state, source, callback))
    }

    /// Report network requests observed while the session runs
    pub fn on_network_activity<F>(&self, callback: F) -> WatchHandle
    where
        F: Fn(Vec<NetworkEntry>) + Send + Sync + 'static,
    {
        self.session.events().on_network_activity(callback)
    }

    /// Network entries observed so far; empty when unavailable
    pub async fn network_activity(&self) -> Vec<NetworkEntry> {
        let events = self.session.events();
        if !events.install_network_observer().await {
            return Vec::new();
        }
        events.network_activity().await
    }

    /// Timings recorded for this element plus page timing
    pub async fn performance_metrics(&self) -> Result<Value> {
        let performance = self.session.performance();
        let element = serde_json::to_value(performance.element_metrics(self.key()))?;
        let driver = self.session.driver();
        let page = performance.page_metrics(driver.as_ref()).await;
        Ok(json!({
            "element": element,
            "page": page,
        }))
    }

    /// Validator bound to the current reference, timed from the store
    pub async fn state_validator(&self) -> Result<ElementStateValidator> {
        let element = self.locator.current_or_resolve().await?;
        let config = self.session.config();
        let store = self.session.store();
        let spec = config.wait_spec();

        let timeout = store.duration_or(keys::EXPLICIT_WAIT, spec.timeout);
        let min_poll = store.duration_or(keys::POLLING_INTERVAL, spec.min_poll);
        let max_poll = store.duration_or(keys::POLLING_MAX_INTERVAL, spec.max_poll);

        Ok(
            ElementStateValidator::new(self.session.driver(), element, spec)
                .with_timeout(timeout)
                .with_polling(min_poll, max_poll),
        )
    }

    /// Evaluate a query, asking again with a fresh reference if the cached one went stale
    async fn query<F, Fut>(&self, check: F) -> Result<bool>
    where
        F: Fn(ElementRef) -> Fut,
        Fut: Future<Output = bool>,
    {
        let element = self.locator.current_or_resolve().await?;
        if check(element.clone()).await {
            return Ok(true);
        }
        // strategies report a stale reference as `false`
        match self.session.driver().get_tag_name(&element).await {
            Err(e) if e.kind() == ErrorKind::StaleElementReference => {
                debug!("'{}' went stale, re-resolving before asking again", self.key());
                self.locator.invalidate().await;
                let fresh = self.locator.resolve().await?;
                Ok(check(fresh).await)
            }
            _ => Ok(false),
        }
    }

    /// Run a mutating interaction through retry, strategies and recovery
    async fn act(&self, interaction: Interaction<'_>) -> Result<()> {
        let operation = interaction.name();
        let this = self;
        let outcome = self
            .session
            .performance()
            .time(
                self.key(),
                operation,
                self.retry
                    .execute(operation, move || this.attempt(interaction)),
            )
            .await;

        outcome.map_err(|e| {
            error!("{} on '{}' failed: {}", operation, self.key(), e);
            Error::action_failed(operation, e)
        })
    }

    async fn attempt(&self, interaction: Interaction<'_>) -> Result<()> {
        let element = self.locator.current_or_resolve().await?;
        let result = self
            .orchestrator
            .perform(interaction, &element, Some(&self.bridge))
            .await;

        if let Err(e) = &result {
            if e.involves(ErrorKind::StaleElementReference) {
                debug!("'{}' went stale, re-resolving on the next attempt", self.key());
                self.locator.invalidate().await;
            }
        }
        result
    }

    /// Run a driver primitive under retry with one recovery per attempt
    async fn direct<T, F, Fut>(&self, operation: &'static str, primitive: F) -> Result<T>
    where
        F: Fn(Arc<dyn Driver>, ElementRef) -> Fut,
        Fut: Future<Output = DriverResult<T>>,
    {
        let driver = self.session.driver();
        let (this, driver, primitive) = (self, &driver, &primitive);

        let outcome = self
            .session
            .performance()
            .time(
                self.key(),
                operation,
                self.retry.execute(operation, move || async move {
                    let element = this.locator.current_or_resolve().await?;
                    let failure = match primitive(driver.clone(), element.clone()).await {
                        Ok(value) => return Ok(value),
                        Err(e) => e,
                    };

                    if failure.kind() == ErrorKind::StaleElementReference {
                        this.locator.invalidate().await;
                    }
                    match this.bridge.recover(&failure, &element).await {
                        Some(recovered) => Ok(primitive(driver.clone(), recovered).await?),
                        None => Err(Error::from(failure)),
                    }
                }),
            )
            .await;

        outcome.map_err(|e| {
            error!("{} on '{}' failed: {}", operation, self.key(), e);
            Error::action_failed(operation, e)
        })
    }
}
