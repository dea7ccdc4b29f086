//! Error-kind keyed recovery registry

use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::driver::{scripts, Driver, DriverError, ElementRef, ErrorKind};
use crate::locator::SelfHealingLocator;

/// Remedy for one kind of driver failure
///
/// Receives the driver and the reference that failed; returns whether the
/// page was brought into a state worth retrying.
pub type Remedy = Arc<dyn Fn(Arc<dyn Driver>, ElementRef) -> BoxFuture<'static, bool> + Send + Sync>;

/// Registry of remedies, matched on the exact [`ErrorKind`]
pub struct RecoveryRegistry {
    driver: Arc<dyn Driver>,
    remedies: RwLock<HashMap<ErrorKind, Remedy>>,
}

impl fmt::Debug for RecoveryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryRegistry")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl RecoveryRegistry {
    /// Create an empty registry
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            remedies: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the stock remedies
    ///
    /// - stale reference: invalidate and re-resolve through `locator`
    /// - click intercepted: scroll into view and hide `overlay_selectors`
    /// - not interactable: scroll into view and wait `settle`
    pub fn with_defaults(
        driver: Arc<dyn Driver>,
        locator: Arc<SelfHealingLocator>,
        overlay_selectors: String,
        settle: Duration,
    ) -> Self {
        let mut remedies: HashMap<ErrorKind, Remedy> = HashMap::new();

        remedies.insert(
            ErrorKind::StaleElementReference,
            Arc::new(move |_driver: Arc<dyn Driver>, _element: ElementRef| {
                let locator = locator.clone();
                async move {
                    locator.invalidate().await;
                    match locator.resolve().await {
                        Ok(fresh) => {
                            debug!("Re-resolved '{}' to {}", locator.key(), fresh);
                            true
                        }
                        Err(e) => {
                            debug!("Re-resolution of '{}' failed: {}", locator.key(), e);
                            false
                        }
                    }
                }
                .boxed()
            }),
        );

        remedies.insert(
            ErrorKind::ElementClickIntercepted,
            Arc::new(move |driver: Arc<dyn Driver>, element: ElementRef| {
                let selectors = overlay_selectors.clone();
                async move {
                    let args = vec![(&element).into(), json!(selectors).into()];
                    match driver.execute_script(scripts::HIDE_OVERLAYS, args).await {
                        Ok(hidden) => {
                            debug!("Hid {} overlays over {}", hidden, element);
                            true
                        }
                        Err(e) => {
                            debug!("Overlay removal failed: {}", e);
                            false
                        }
                    }
                }
                .boxed()
            }),
        );

        remedies.insert(
            ErrorKind::ElementNotInteractable,
            Arc::new(move |driver: Arc<dyn Driver>, element: ElementRef| {
                async move {
                    let args = vec![(&element).into()];
                    match driver.execute_script(scripts::SCROLL_INTO_VIEW, args).await {
                        Ok(_) => {
                            tokio::time::sleep(settle).await;
                            true
                        }
                        Err(e) => {
                            debug!("Scroll into view failed: {}", e);
                            false
                        }
                    }
                }
                .boxed()
            }),
        );

        Self {
            driver,
            remedies: RwLock::new(remedies),
        }
    }

    /// Register (or replace) the remedy for `kind`
    pub async fn add<F, Fut>(&self, kind: ErrorKind, handler: F)
    where
        F: Fn(Arc<dyn Driver>, ElementRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let remedy: Remedy = Arc::new(move |driver: Arc<dyn Driver>, element: ElementRef| {
            handler(driver, element).boxed()
        });
        if self.remedies.write().await.insert(kind, remedy).is_some() {
            debug!("Replaced remedy for {}", kind);
        }
    }

    pub async fn remove(&self, kind: ErrorKind) -> bool {
        self.remedies.write().await.remove(&kind).is_some()
    }

    pub async fn clear(&self) {
        self.remedies.write().await.clear();
    }

    pub async fn has_strategy_for(&self, kind: ErrorKind) -> bool {
        self.remedies.read().await.contains_key(&kind)
    }

    pub async fn len(&self) -> usize {
        self.remedies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.remedies.read().await.is_empty()
    }

    /// Run the remedy registered for the failure's kind
    ///
    /// Returns `false` when no remedy is registered.
    pub async fn attempt(&self, failure: &DriverError, element: &ElementRef) -> bool {
        let kind = failure.kind();
        let remedy = self.remedies.read().await.get(&kind).cloned();
        match remedy {
            Some(remedy) => {
                debug!("Attempting recovery from {} on {}", kind, element);
                let recovered = remedy(self.driver.clone(), element.clone()).await;
                if !recovered {
                    warn!("Recovery from {} on {} failed", kind, element);
                }
                recovered
            }
            None => {
                debug!("No recovery available for {}", kind);
                false
            }
        }
    }
}
