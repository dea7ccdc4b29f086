//! Unified error types for flakeguard

use thiserror::Error;

use crate::driver::{DriverError, ErrorKind};
use crate::strategy::StrategyKind;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by one strategy during an orchestrated operation
#[derive(Debug, Clone)]
pub struct StrategyFailure {
    /// Strategy that failed
    pub strategy: StrategyKind,
    /// Driver cause, if the strategy observed one
    pub cause: Option<DriverError>,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.strategy, cause),
            None => write!(f, "{}: post-condition not met", self.strategy),
        }
    }
}

/// Unified error type for flakeguard
#[derive(Error, Debug)]
pub enum Error {
    /// Error reported by the underlying driver
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Every configured strategy failed for an operation
    #[error("All strategies failed for '{operation}': {}", summarize(.failures))]
    StrategiesExhausted {
        operation: String,
        failures: Vec<StrategyFailure>,
    },

    /// Wait or retry budget exhausted
    #[error("Timeout after {elapsed_ms} ms and {attempts} attempts")]
    Timeout {
        elapsed_ms: u64,
        attempts: u32,
        #[source]
        last_cause: Option<Box<Error>>,
    },

    /// No candidate locator (registered or synthesized) matched
    #[error("Element not found: {key}")]
    ElementNotFound {
        key: String,
        #[source]
        last_error: Option<DriverError>,
    },

    /// Mutating operation failed after strategies, retries and recovery
    #[error("Action '{operation}' failed")]
    ActionFailed {
        operation: String,
        #[source]
        source: Box<Error>,
    },

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(key: S, last_error: Option<DriverError>) -> Self {
        Error::ElementNotFound {
            key: key.into(),
            last_error,
        }
    }

    /// Wrap a terminal failure of a mutating operation
    pub fn action_failed<S: Into<String>>(operation: S, source: Error) -> Self {
        Error::ActionFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Programming errors are never retried
    pub fn is_programming_error(&self) -> bool {
        match self {
            Error::InvalidArgument(_) | Error::InvalidState(_) | Error::Configuration(_) => true,
            Error::Driver(e) => e.kind() == ErrorKind::InvalidArgument,
            _ => false,
        }
    }

    /// Check if the retry layer may attempt this operation again
    pub fn is_retryable(&self) -> bool {
        !self.is_programming_error()
    }

    /// Driver error kinds carried by this error, outermost first
    pub fn driver_kinds(&self) -> Vec<ErrorKind> {
        match self {
            Error::Driver(e) => vec![e.kind()],
            Error::StrategiesExhausted { failures, .. } => failures
                .iter()
                .filter_map(|f| f.cause.as_ref().map(|c| c.kind()))
                .collect(),
            Error::ElementNotFound { last_error, .. } => {
                last_error.iter().map(|e| e.kind()).collect()
            }
            Error::Timeout { last_cause, .. } => last_cause
                .as_ref()
                .map(|c| c.driver_kinds())
                .unwrap_or_default(),
            Error::ActionFailed { source, .. } => source.driver_kinds(),
            _ => Vec::new(),
        }
    }

    /// Check whether any driver cause in this error has the given kind
    pub fn involves(&self, kind: ErrorKind) -> bool {
        self.driver_kinds().contains(&kind)
    }
}
