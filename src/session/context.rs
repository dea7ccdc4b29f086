//! Session context
//!
//! Owns everything scoped to one automation session.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Config, ConfigStore};
use crate::driver::Driver;
use crate::monitor::{ElementEventMonitor, PerformanceMonitor};
use crate::retry::{ContextProbe, ScriptContextProbe};

/// Per-session state shared by every resilient element of the session
///
/// Background watchers run on child tokens of the session token, so
/// [`SessionContext::shutdown`] (or dropping the context) stops all of them.
#[derive(Debug)]
pub struct SessionContext {
    id: String,
    created_at: DateTime<Utc>,
    driver: Arc<dyn Driver>,
    config: Config,
    store: Arc<ConfigStore>,
    performance: Arc<PerformanceMonitor>,
    events: ElementEventMonitor,
    probe: Arc<dyn ContextProbe>,
    token: CancellationToken,
}

impl SessionContext {
    /// Create a session probing the retry context through page scripts
    pub fn new(driver: Arc<dyn Driver>, config: Config) -> Arc<Self> {
        let probe = Arc::new(ScriptContextProbe::from_config(driver.clone(), &config));
        Self::with_probe(driver, config, probe)
    }

    /// Create a session with a custom retry context probe
    pub fn with_probe(
        driver: Arc<dyn Driver>,
        config: Config,
        probe: Arc<dyn ContextProbe>,
    ) -> Arc<Self> {
        let token = CancellationToken::new();
        let events = ElementEventMonitor::new(driver.clone(), config.monitor_poll(), token.clone());
        let session = Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            store: Arc::new(ConfigStore::from_config(&config)),
            performance: Arc::new(PerformanceMonitor::new()),
            driver,
            config,
            events,
            probe,
            token,
        };
        info!("Session {} started", session.id);
        Arc::new(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn driver(&self) -> Arc<dyn Driver> {
        self.driver.clone()
    }

    /// Static configuration the session was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runtime-tunable configuration store
    pub fn store(&self) -> Arc<ConfigStore> {
        self.store.clone()
    }

    pub fn performance(&self) -> Arc<PerformanceMonitor> {
        self.performance.clone()
    }

    pub fn events(&self) -> &ElementEventMonitor {
        &self.events
    }

    pub fn probe(&self) -> Arc<dyn ContextProbe> {
        self.probe.clone()
    }

    /// Token cancelled when the session shuts down
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Stop every background watcher of the session
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("Session {} shutting down", self.id);
            self.token.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        debug!("Dropping session {}", self.id);
        self.token.cancel();
    }
}
