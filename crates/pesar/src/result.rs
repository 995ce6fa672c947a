//! Result and error types for Pesar.

use thiserror::Error;

/// Result type for Pesar operations
pub type PesarResult<T> = Result<T, PesarError>;

/// Errors that can occur in Pesar
#[derive(Debug, Error)]
pub enum PesarError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Connection to browser failed
    #[error("Failed to connect to browser: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A locator's fallback chain matched no element
    #[error("Element not found: {expected}")]
    NotFound {
        /// Description of the selector/text that was expected to match
        expected: String,
    },

    /// An expected DOM state did not hold within the polling timeout
    #[error("Assertion failed: expected {expected}, got {actual}")]
    AssertionFailed {
        /// Expected state
        expected: String,
        /// Observed state
        actual: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Uncaught exception thrown by the page under test
    #[error("Uncaught page exception: {message}")]
    PageException {
        /// Exception message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario file could not be parsed or is invalid
    #[error("Scenario error: {message}")]
    Scenario {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PesarError {
    /// Create a not-found error naming the expected selector/text
    #[must_use]
    pub fn not_found(expected: impl Into<String>) -> Self {
        Self::NotFound {
            expected: expected.into(),
        }
    }

    /// Create a scenario error
    #[must_use]
    pub fn scenario(message: impl Into<String>) -> Self {
        Self::Scenario {
            message: message.into(),
        }
    }

    /// Create an assertion failure with an expected-vs-actual diff
    #[must_use]
    pub fn assertion(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::AssertionFailed {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this failure aborts only the current test case.
    ///
    /// All Pesar failures are scoped to a single case; browser-level errors
    /// additionally poison the session and force a relaunch.
    #[must_use]
    pub const fn poisons_session(&self) -> bool {
        matches!(
            self,
            Self::BrowserNotFound | Self::BrowserLaunch { .. } | Self::ConnectionFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_expected() {
        let err = PesarError::not_found("input[name*=\"height\" i]");
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn test_assertion_diff() {
        let err = PesarError::assertion("text containing '18.5'", "'17.3 kg/m2'");
        let msg = err.to_string();
        assert!(msg.contains("18.5"));
        assert!(msg.contains("17.3"));
    }

    #[test]
    fn test_session_poisoning() {
        assert!(PesarError::BrowserNotFound.poisons_session());
        assert!(!PesarError::Timeout { ms: 5000 }.poisons_session());
        assert!(!PesarError::not_found("#BMI").poisons_session());
    }
}
