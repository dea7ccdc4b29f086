//! Flakeguard: resilience layer for browser UI automation
//!
//! This library wraps a browser-automation driver with self-healing locators,
//! fallback interaction strategies, adaptive waits, context-aware retries and
//! error-kind keyed recovery.

pub mod error;
pub mod config;

pub mod driver;
pub mod session;
pub mod locator;
pub mod strategy;
pub mod wait;
pub mod retry;
pub mod recovery;
pub mod monitor;
pub mod element;

// Re-exports
pub use element::ResilientElement;
pub use error::{Error, Result};
pub use session::SessionContext;

/// Flakeguard library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
