//! Self-healing locator resolver

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::candidate::{ElementSnapshot, LocatorCandidate};
use super::synthesis;
use crate::driver::{Driver, DriverError, DriverResult, ElementRef, Locator};
use crate::error::{Error, Result};
use crate::monitor::ElementSource;

/// Resolves a logical element through a ranked list of candidate locators
///
/// When every candidate fails, new candidates are synthesized from the last
/// successfully resolved element and appended to the list.
#[derive(Debug)]
pub struct SelfHealingLocator {
    key: String,
    driver: Arc<dyn Driver>,
    candidates: RwLock<Vec<Arc<LocatorCandidate>>>,
    next_order: AtomicU64,
    current: RwLock<Option<ElementRef>>,
    snapshot: RwLock<Option<ElementSnapshot>>,
}

impl SelfHealingLocator {
    /// Create a resolver; at least one locator is required
    pub fn new<S: Into<String>>(
        key: S,
        driver: Arc<dyn Driver>,
        locators: Vec<Locator>,
    ) -> Result<Self> {
        let key = key.into();
        if locators.is_empty() {
            return Err(Error::invalid_argument(format!(
                "Element '{}' needs at least one locator",
                key
            )));
        }

        let mut candidates: Vec<Arc<LocatorCandidate>> = Vec::with_capacity(locators.len());
        for locator in locators {
            if candidates.iter().any(|c| c.locator() == &locator) {
                continue;
            }
            let order = candidates.len() as u64;
            candidates.push(Arc::new(LocatorCandidate::new(locator, order)));
        }

        Ok(Self {
            key,
            driver,
            next_order: AtomicU64::new(candidates.len() as u64),
            candidates: RwLock::new(candidates),
            current: RwLock::new(None),
            snapshot: RwLock::new(None),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Candidates sorted by score, ties by registration order
    pub async fn ranked(&self) -> Vec<Arc<LocatorCandidate>> {
        let mut ranked = self.candidates.read().await.clone();
        ranked.sort_by(|a, b| {
            b.score()
                .cmp(&a.score())
                .then_with(|| a.order().cmp(&b.order()))
        });
        ranked
    }

    pub async fn ranked_locators(&self) -> Vec<Locator> {
        self.ranked()
            .await
            .iter()
            .map(|c| c.locator().clone())
            .collect()
    }

    pub async fn success_rates(&self) -> HashMap<Locator, f64> {
        self.candidates
            .read()
            .await
            .iter()
            .map(|c| (c.locator().clone(), c.success_rate()))
            .collect()
    }

    /// Register an extra locator; false if it is already known
    pub async fn add_alternative_locator(&self, locator: Locator) -> bool {
        let mut candidates = self.candidates.write().await;
        if candidates.iter().any(|c| c.locator() == &locator) {
            return false;
        }
        let order = self.next_order.fetch_add(1, Ordering::Relaxed);
        debug!("Adding locator {} to '{}'", locator, self.key);
        candidates.push(Arc::new(LocatorCandidate::new(locator, order)));
        true
    }

    /// Remove a locator; the last remaining locator cannot be removed
    pub async fn remove_locator(&self, locator: &Locator) -> Result<bool> {
        let mut candidates = self.candidates.write().await;
        let position = match candidates.iter().position(|c| c.locator() == locator) {
            Some(p) => p,
            None => return Ok(false),
        };
        if candidates.len() == 1 {
            return Err(Error::invalid_state(format!(
                "Cannot remove the last locator of '{}'",
                self.key
            )));
        }
        candidates.remove(position);
        Ok(true)
    }

    pub async fn current(&self) -> Option<ElementRef> {
        self.current.read().await.clone()
    }

    pub async fn snapshot(&self) -> Option<ElementSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Drop the cached reference so the next access re-resolves
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// Cached reference, resolving on a miss
    pub async fn current_or_resolve(&self) -> Result<ElementRef> {
        if let Some(element) = self.current().await {
            return Ok(element);
        }
        self.resolve().await
    }

    /// Resolve the element, healing the candidate list if needed
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn resolve(&self) -> Result<ElementRef> {
        let mut last_error = None;

        for candidate in self.ranked().await {
            match self.try_candidate(&candidate).await {
                Ok(element) => return Ok(self.adopt(element).await),
                Err(e) => last_error = Some(e),
            }
        }

        for candidate in self.heal().await {
            match self.try_candidate(&candidate).await {
                Ok(element) => {
                    info!("'{}' healed with {}", self.key, candidate.locator());
                    return Ok(self.adopt(element).await);
                }
                Err(e) => last_error = Some(e),
            }
        }

        warn!("No locator of '{}' matched", self.key);
        Err(Error::element_not_found(self.key.clone(), last_error))
    }

    /// Resolve every match of every candidate
    ///
    /// Results are not de-duplicated; an empty match counts as a failure.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn resolve_all(&self) -> Result<Vec<ElementRef>> {
        let mut last_error = None;
        let mut found = self.collect_all(self.ranked().await, &mut last_error).await;

        if found.is_empty() {
            let healed = self.heal().await;
            found = self.collect_all(healed, &mut last_error).await;
        }

        if found.is_empty() {
            warn!("No locator of '{}' matched any element", self.key);
            return Err(Error::element_not_found(self.key.clone(), last_error));
        }
        Ok(found)
    }

    async fn collect_all(
        &self,
        candidates: Vec<Arc<LocatorCandidate>>,
        last_error: &mut Option<DriverError>,
    ) -> Vec<ElementRef> {
        let mut found = Vec::new();
        for candidate in candidates {
            match self.driver.find_elements(candidate.locator()).await {
                Ok(elements) if !elements.is_empty() => {
                    candidate.record_success();
                    found.extend(elements);
                }
                Ok(_) => {
                    candidate.record_failure();
                    *last_error = Some(DriverError::NoSuchElement(format!(
                        "no match for {}",
                        candidate.locator()
                    )));
                }
                Err(e) => {
                    candidate.record_failure();
                    *last_error = Some(e);
                }
            }
        }
        found
    }

    async fn try_candidate(&self, candidate: &LocatorCandidate) -> DriverResult<ElementRef> {
        match self.driver.find_element(candidate.locator()).await {
            Ok(element) => {
                candidate.record_success();
                debug!("'{}' resolved with {}", self.key, candidate.locator());
                Ok(element)
            }
            Err(e) => {
                candidate.record_failure();
                debug!("{} failed for '{}': {}", candidate.locator(), self.key, e);
                Err(e)
            }
        }
    }

    async fn adopt(&self, element: ElementRef) -> ElementRef {
        *self.current.write().await = Some(element.clone());

        let snapshot = self.capture(&element).await;
        if !snapshot.is_empty() {
            *self.snapshot.write().await = Some(snapshot);
        }
        element
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Option<String> {
        self.driver.get_attribute(element, name).await.ok().flatten()
    }

    /// Best-effort snapshot; unreadable attributes stay `None`
    async fn capture(&self, element: &ElementRef) -> ElementSnapshot {
        ElementSnapshot {
            id: self.attribute(element, "id").await,
            class: self.attribute(element, "class").await,
            name: self.attribute(element, "name").await,
            text: self.driver.get_text(element).await.ok(),
            tag: self.driver.get_tag_name(element).await.ok(),
        }
    }

    /// Append candidates synthesized from the last snapshot
    async fn heal(&self) -> Vec<Arc<LocatorCandidate>> {
        let snapshot = match self.snapshot().await {
            Some(s) => s,
            None => return Vec::new(),
        };

        let mut candidates = self.candidates.write().await;
        let mut added = Vec::new();
        for locator in synthesis::synthesize(&snapshot) {
            if candidates.iter().any(|c| c.locator() == &locator) {
                continue;
            }
            let order = self.next_order.fetch_add(1, Ordering::Relaxed);
            let candidate = Arc::new(LocatorCandidate::synthesized(locator, order));
            candidates.push(candidate.clone());
            added.push(candidate);
        }

        if !added.is_empty() {
            info!(
                "Synthesized {} locator(s) for '{}'",
                added.len(),
                self.key
            );
        }
        added
    }
}

#[async_trait]
impl ElementSource for SelfHealingLocator {
    async fn current_element(&self) -> Result<ElementRef> {
        self.current_or_resolve().await
    }

    async fn invalidate(&self) {
        SelfHealingLocator::invalidate(self).await
    }
}
