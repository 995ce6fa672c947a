//! Per-case test context.
//!
//! Every test case starts from an explicit `TestContext` value instead of an
//! ambient global hook: viewport, storage clearing, the blocklist, and the
//! benign-exception policy all travel with the case. Contexts are never
//! shared across cases; test isolation means a fresh one per case.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::config::{SuiteConfig, Viewport};
use crate::network::Blocklist;

/// Uncaught page exceptions matching these fragments are swallowed.
///
/// Third-party scripts on the page under test routinely throw these; they
/// say nothing about the scenario being exercised.
pub const BENIGN_EXCEPTIONS: [&str; 3] = [
    "Script error",
    "Non-Error promise rejection",
    "ResizeObserver loop limit exceeded",
];

/// Whether an uncaught page exception should be swallowed
#[must_use]
pub fn is_benign_exception(message: &str) -> bool {
    BENIGN_EXCEPTIONS.iter().any(|b| message.contains(b))
}

/// Explicit per-case setup state
#[derive(Debug, Clone)]
pub struct TestContext {
    /// Unique id for this case execution (artifact correlation)
    pub run_id: Uuid,
    /// Viewport applied before the first navigation
    pub viewport: Viewport,
    /// Clear cookies before the case starts
    pub clear_cookies: bool,
    /// Clear local storage before the case starts
    pub clear_local_storage: bool,
    /// Request blocklist installed for the lifetime of the case
    pub blocklist: Blocklist,
}

impl TestContext {
    /// Context for one case under the given suite configuration
    #[must_use]
    pub fn for_case(config: &SuiteConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            viewport: config.viewport,
            clear_cookies: config.test_isolation,
            clear_local_storage: config.test_isolation,
            blocklist: Blocklist::new(),
        }
    }

    /// Decide whether a page exception fails the current case
    #[must_use]
    pub fn exception_fails_case(&self, message: &str) -> bool {
        !is_benign_exception(message)
    }
}

/// Uncaught page exceptions observed while a case runs.
///
/// The live backend pushes from its event listener task; the executor drains
/// between steps and applies [`TestContext::exception_fails_case`]. Clones
/// share the same underlying log.
#[derive(Debug, Clone, Default)]
pub struct ExceptionLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ExceptionLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an uncaught exception message
    pub fn push(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(message.into());
        }
    }

    /// Drain every message observed since the last call
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}
