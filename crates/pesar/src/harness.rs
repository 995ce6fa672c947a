//! Test harness: cases, results, and whole-case retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{Retries, RunMode};

/// A single test case within a scenario
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Case name
    pub name: String,
    /// Case timeout in milliseconds
    pub timeout_ms: u64,
}

impl TestCase {
    /// Create a test case with the default 30 s timeout
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout_ms: 30_000,
        }
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }
}

/// Result of running a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Case name
    pub name: String,
    /// Whether the case passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Case duration
    pub duration: Duration,
    /// Attempts used (1 = passed first try)
    pub attempts: u32,
}

impl TestResult {
    /// A passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            duration: Duration::ZERO,
            attempts: 1,
        }
    }

    /// A failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
            attempts: 1,
        }
    }

    /// Set the duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the attempts used
    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Run a case closure with whole-case retries.
///
/// The closure runs once plus up to the configured retry count for the
/// mode; the first pass wins. Failures are scoped to the attempt — each
/// retry starts from scratch, exactly like a fresh case.
pub fn run_with_retries<F>(
    name: &str,
    retries: Retries,
    mode: RunMode,
    mut attempt: F,
) -> TestResult
where
    F: FnMut() -> Result<(), String>,
{
    let attempts = retries.attempts_for(mode);
    let mut last_error = String::new();
    for n in 1..=attempts {
        match attempt() {
            Ok(()) => return TestResult::pass(name).with_attempts(n),
            Err(e) => last_error = e,
        }
    }
    TestResult::fail(name, last_error).with_attempts(attempts)
}

/// Aggregated results for one scenario run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Scenario/suite name
    pub suite_name: String,
    /// Individual case results
    pub results: Vec<TestResult>,
    /// Total wall-clock duration
    pub duration: Duration,
}

impl SuiteResults {
    /// New results for a named suite
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            results: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a case result
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Whether every case passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count of passing cases
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count of failing cases
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    /// Aggregate process exit code: 0 iff all cases passed
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }
}
