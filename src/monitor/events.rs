//! Background element-state and network watchers
//!
//! Every watcher is a tokio task driven by a child of the session's
//! cancellation token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::driver::{scripts, Driver, ElementRef, ErrorKind};
use crate::error::{Error, Result};

/// Element state a watcher waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchedState {
    Visible,
    Enabled,
    Selected,
}

impl FromStr for WatchedState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visible" | "displayed" => Ok(WatchedState::Visible),
            "enabled" => Ok(WatchedState::Enabled),
            "selected" => Ok(WatchedState::Selected),
            other => Err(Error::invalid_argument(format!(
                "Unknown element state: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for WatchedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WatchedState::Visible => "visible",
            WatchedState::Enabled => "enabled",
            WatchedState::Selected => "selected",
        };
        f.write_str(name)
    }
}

/// Network entry observed in the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub name: String,
    #[serde(default)]
    pub entry_type: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// Supplies the element a watcher observes
#[async_trait]
pub trait ElementSource: Send + Sync {
    /// Current reference, resolving if needed
    async fn current_element(&self) -> Result<ElementRef>;

    /// Drop the cached reference
    async fn invalidate(&self);
}

/// Handle to a background watcher
#[derive(Debug)]
pub struct WatchHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the watcher task to end
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            debug!("Watcher task ended abnormally: {}", e);
        }
    }
}

/// Element event monitor
#[derive(Debug, Clone)]
pub struct ElementEventMonitor {
    driver: Arc<dyn Driver>,
    poll: Duration,
    parent: CancellationToken,
}

impl ElementEventMonitor {
    pub fn new(driver: Arc<dyn Driver>, poll: Duration, parent: CancellationToken) -> Self {
        Self {
            driver,
            poll,
            parent,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// Fire `callback` once, the first time the element is observed in `state`
    pub fn on_state_change<F>(
        &self,
        state: WatchedState,
        source: Arc<dyn ElementSource>,
        callback: F,
    ) -> WatchHandle
    where
        F: FnOnce(ElementRef) + Send + 'static,
    {
        let token = self.parent.child_token();
        let watch = token.clone();
        let driver = self.driver.clone();
        let poll = self.poll;

        let task = tokio::spawn(async move {
            debug!("Watching for {} state", state);
            loop {
                if watch.is_cancelled() {
                    break;
                }
                if let Some(element) = observe(driver.as_ref(), source.as_ref(), state).await {
                    info!("{} became {}", element, state);
                    callback(element);
                    return;
                }
                tokio::select! {
                    _ = watch.cancelled() => break,
                    _ = tokio::time::sleep(poll) => {}
                }
            }
            debug!("Watcher for {} state cancelled", state);
        });

        WatchHandle { token, task }
    }

    /// Install the page network observer; false when unavailable
    pub async fn install_network_observer(&self) -> bool {
        match self
            .driver
            .execute_script(scripts::INSTALL_NETWORK_OBSERVER, vec![])
            .await
        {
            Ok(Value::Bool(installed)) => installed,
            Ok(_) => false,
            Err(e) => {
                debug!("Network observer unavailable: {}", e);
                false
            }
        }
    }

    /// Report newly observed network entries until cancelled
    pub fn on_network_activity<F>(&self, callback: F) -> WatchHandle
    where
        F: Fn(Vec<NetworkEntry>) + Send + Sync + 'static,
    {
        let token = self.parent.child_token();
        let watch = token.clone();
        let monitor = self.clone();

        let task = tokio::spawn(async move {
            if !monitor.install_network_observer().await {
                debug!("Network activity watcher not started");
                return;
            }
            let mut seen = 0usize;
            loop {
                tokio::select! {
                    _ = watch.cancelled() => break,
                    _ = tokio::time::sleep(monitor.poll) => {}
                }
                let entries = monitor.network_activity().await;
                if entries.len() > seen {
                    callback(entries[seen..].to_vec());
                }
                seen = entries.len();
            }
        });

        WatchHandle { token, task }
    }

    /// Entries observed so far; empty when the facility is absent
    pub async fn network_activity(&self) -> Vec<NetworkEntry> {
        match self
            .driver
            .execute_script(scripts::READ_NETWORK_ENTRIES, vec![])
            .await
        {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                debug!("Network entries unavailable: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn clear_network_activity(&self) {
        if let Err(e) = self
            .driver
            .execute_script(scripts::CLEAR_NETWORK_ENTRIES, vec![])
            .await
        {
            debug!("Failed to clear network entries: {}", e);
        }
    }
}

async fn observe(
    driver: &dyn Driver,
    source: &dyn ElementSource,
    state: WatchedState,
) -> Option<ElementRef> {
    let element = source.current_element().await.ok()?;
    let observed = match state {
        WatchedState::Visible => driver.is_displayed(&element).await,
        WatchedState::Enabled => driver.is_enabled(&element).await,
        WatchedState::Selected => driver.is_selected(&element).await,
    };
    match observed {
        Ok(true) => Some(element),
        Ok(false) => None,
        Err(e) => {
            if e.kind() == ErrorKind::StaleElementReference {
                source.invalidate().await;
            }
            None
        }
    }
}
