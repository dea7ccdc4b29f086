//! Per-element performance records

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::driver::{scripts, Driver};

/// Timing of one (element, action) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRecord {
    /// Wall-clock start of the most recent run
    pub started_at: DateTime<Utc>,
    /// Duration of the most recent completed run
    pub duration_ms: Option<u64>,
}

type RecordKey = (String, String);

/// One running measurement, handed out by [`PerformanceMonitor::start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    id: u64,
    key: String,
    action: String,
}

impl Timer {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

/// Session-scoped performance monitor
///
/// Records are never expired; [`PerformanceMonitor::clear`] drops them all.
/// Overlapping runs of the same action each get their own [`Timer`].
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    records: DashMap<RecordKey, PerformanceRecord>,
    running: DashMap<u64, Instant>,
    next_timer: AtomicU64,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of `action` on `key`
    pub fn start(&self, key: &str, action: &str) -> Timer {
        let timer = Timer {
            id: self.next_timer.fetch_add(1, Ordering::Relaxed),
            key: key.to_string(),
            action: action.to_string(),
        };
        self.running.insert(timer.id, Instant::now());
        self.records.insert(
            (timer.key.clone(), timer.action.clone()),
            PerformanceRecord {
                started_at: Utc::now(),
                duration_ms: None,
            },
        );
        timer
    }

    /// Stop `timer` and return its duration
    ///
    /// The record of its (key, action) pair keeps the latest finished run.
    pub fn end(&self, timer: &Timer) -> Option<u64> {
        let started = match self.running.remove(&timer.id) {
            Some((_, started)) => started,
            None => {
                warn!("No running timer for {}:{}", timer.key, timer.action);
                return None;
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        let id = (timer.key.clone(), timer.action.clone());
        if let Some(mut record) = self.records.get_mut(&id) {
            record.duration_ms = Some(duration_ms);
        }
        debug!("{}:{} took {}ms", timer.key, timer.action, duration_ms);
        Some(duration_ms)
    }

    /// Time a future under (`key`, `action`)
    pub async fn time<T, Fut>(&self, key: &str, action: &str, operation: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        let timer = self.start(key, action);
        let output = operation.await;
        self.end(&timer);
        output
    }

    /// Records of one element, keyed by action
    pub fn element_metrics(&self, key: &str) -> HashMap<String, PerformanceRecord> {
        self.records
            .iter()
            .filter(|e| e.key().0 == key)
            .map(|e| (e.key().1.clone(), e.value().clone()))
            .collect()
    }

    /// All records, keyed by element then action
    pub fn all_metrics(&self) -> BTreeMap<String, BTreeMap<String, PerformanceRecord>> {
        let mut all: BTreeMap<String, BTreeMap<String, PerformanceRecord>> = BTreeMap::new();
        for entry in self.records.iter() {
            let (key, action) = entry.key();
            all.entry(key.clone())
                .or_default()
                .insert(action.clone(), entry.value().clone());
        }
        all
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&self) {
        self.records.clear();
        self.running.clear();
    }

    /// Navigation and resource timing of the current page
    ///
    /// An empty object when the page exposes no timing facility.
    pub async fn page_metrics(&self, driver: &dyn Driver) -> Value {
        match driver.execute_script(scripts::PAGE_PERFORMANCE, vec![]).await {
            Ok(Value::Object(metrics)) => Value::Object(metrics),
            Ok(_) => json!({}),
            Err(e) => {
                debug!("Page performance unavailable: {}", e);
                json!({})
            }
        }
    }
}
