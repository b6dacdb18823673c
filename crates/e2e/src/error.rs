//! Error types for E2E testing

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Timed out after {timeout:?} waiting for {condition} ({polls} polls, last state: {last_state})")]
    Timeout {
        condition: String,
        timeout: Duration,
        polls: u32,
        last_state: String,
    },

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Session faulted while waiting for {condition}: {source}")]
    Faulted {
        condition: String,
        #[source]
        source: Box<E2eError>,
    },

    #[error("WebDriver error ({code}): {message}")]
    WebDriver { code: String, message: String },

    #[error("WebDriver service failed to start: {0}")]
    DriverStartup(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl E2eError {
    /// Errors a poll loop treats as "not yet" rather than a fault.
    pub fn is_transient(&self) -> bool {
        matches!(self, E2eError::NotFound(_) | E2eError::StaleElement(_))
    }

    /// Whether this error means a wait or lookup never saw what it needed.
    pub fn is_timeout_or_missing(&self) -> bool {
        matches!(self, E2eError::Timeout { .. } | E2eError::NotFound(_))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail with [`E2eError::AssertionFailed`] unless `cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::E2eError::AssertionFailed(format!($($arg)+)));
        }
    };
}
