//! Error types shared by the Contact List test harness

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`E2eError`]
pub type E2eResult<T> = std::result::Result<T, E2eError>;

/// Everything that can end a scenario early.
///
/// A non-2xx HTTP status is deliberately absent: the API client hands those
/// back as data so scenarios can assert on them.
#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Assertion failed: {context}: expected {expected}, got {actual}")]
    Assertion {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("Timeout after {waited_ms} ms waiting for: {condition}")]
    Timeout { condition: String, waited_ms: u64 },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Browser driver protocol error: {0}")]
    Driver(String),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse classification used in reports.
///
/// Timeouts are kept apart from assertion failures so flaky timing can be
/// told apart from wrong behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Assertion,
    Timeout,
    Harness,
}

impl E2eError {
    /// Build an assertion failure from anything printable
    pub fn assertion(
        context: impl Into<String>,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        E2eError::Assertion {
            context: context.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            E2eError::Transport(_) => FailureKind::Transport,
            E2eError::Assertion { .. } => FailureKind::Assertion,
            E2eError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::Harness,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_message_carries_both_values() {
        let err = E2eError::assertion("status of GET /users/me", 200, 401);
        let msg = err.to_string();
        assert!(msg.contains("expected 200"));
        assert!(msg.contains("got 401"));
        assert_eq!(err.kind(), FailureKind::Assertion);
    }

    #[test]
    fn timeout_is_its_own_kind() {
        let err = E2eError::Timeout {
            condition: "#logout visible".to_string(),
            waited_ms: 10_000,
        };
        assert!(err.is_timeout());
        assert_eq!(err.kind(), FailureKind::Timeout);
        assert_ne!(err.kind(), FailureKind::Assertion);
    }

    #[test]
    fn plumbing_errors_are_harness_failures() {
        assert_eq!(E2eError::ElementNotFound("#x".into()).kind(), FailureKind::Harness);
        assert_eq!(E2eError::Driver("eof".into()).kind(), FailureKind::Harness);
    }
}
