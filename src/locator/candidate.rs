//! Locator candidates and element snapshots

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::driver::Locator;

/// A locator with its resolution track record
#[derive(Debug)]
pub struct LocatorCandidate {
    locator: Locator,
    successes: AtomicU64,
    failures: AtomicU64,
    order: u64,
    synthesized: bool,
}

impl LocatorCandidate {
    pub fn new(locator: Locator, order: u64) -> Self {
        Self {
            locator,
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            order,
            synthesized: false,
        }
    }

    /// Candidate derived from a snapshot rather than registered by the caller
    pub fn synthesized(locator: Locator, order: u64) -> Self {
        Self {
            synthesized: true,
            ..Self::new(locator, order)
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Registration order, used to break score ties
    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Successes minus failures
    pub fn score(&self) -> i64 {
        self.successes() as i64 - self.failures() as i64
    }

    /// Fraction of successful resolutions; 0 when never tried
    pub fn success_rate(&self) -> f64 {
        let successes = self.successes();
        let total = successes + self.failures();
        if total == 0 {
            return 0.0;
        }
        successes as f64 / total as f64
    }
}

/// Observable attributes of the last resolved element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementSnapshot {
    pub id: Option<String>,
    pub class: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub tag: Option<String>,
}

impl ElementSnapshot {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.class.is_none()
            && self.name.is_none()
            && self.text.is_none()
            && self.tag.is_none()
    }
}
