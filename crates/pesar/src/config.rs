//! Suite configuration.
//!
//! Mirrors the knobs an external runner needs: base URL, scenario discovery
//! glob, independent timeouts, viewport, per-mode retry counts, artifact
//! folders, and browser-launch flag injection for ad blocking.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::result::{PesarError, PesarResult};

/// Default command timeout (ms)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Default request timeout (ms)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default response timeout (ms)
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Default page-load timeout (ms)
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Independently configurable operation timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Timeout for a single command (ms)
    pub command_ms: u64,
    /// Timeout for an outbound request (ms)
    pub request_ms: u64,
    /// Timeout for a response (ms)
    pub response_ms: u64,
    /// Timeout for a full page load (ms)
    pub page_load_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            request_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            response_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            page_load_ms: DEFAULT_PAGE_LOAD_TIMEOUT_MS,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Whole-case retry counts, distinct per execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Retries {
    /// Retries in headless (run) mode
    pub run_mode: u32,
    /// Retries in interactive (open) mode
    pub open_mode: u32,
}

/// Execution mode for the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Headless CI-style execution
    #[default]
    Headless,
    /// Interactive execution with a headed browser
    Interactive,
}

impl Retries {
    /// Total attempts for a test case in the given mode (1 + retries)
    #[must_use]
    pub const fn attempts_for(&self, mode: RunMode) -> u32 {
        let retries = match mode {
            RunMode::Headless => self.run_mode,
            RunMode::Interactive => self.open_mode,
        };
        retries + 1
    }
}

/// Suite configuration, deserializable from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL for the system under test
    pub base_url: String,
    /// Glob pattern for scenario files
    pub scenario_pattern: String,
    /// Glob patterns excluded from discovery
    pub exclude_patterns: Vec<String>,
    /// Operation timeouts
    pub timeouts: Timeouts,
    /// Viewport dimensions
    pub viewport: Viewport,
    /// Whole-case retry counts
    pub retries: Retries,
    /// Folder for screenshots
    pub screenshots_folder: PathBuf,
    /// Folder for videos
    pub videos_folder: PathBuf,
    /// Record video of headless runs
    pub video: bool,
    /// Capture a screenshot when a case fails in run mode
    pub screenshot_on_run_failure: bool,
    /// Start every case from a clean browser state
    pub test_isolation: bool,
    /// Extra browser-launch arguments (ad blocking, popup suppression)
    pub browser_args: Vec<String>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://practice.expandtesting.com".to_string(),
            scenario_pattern: "scenarios/**/*.yaml".to_string(),
            exclude_patterns: vec!["**/__snapshots__/*".to_string()],
            timeouts: Timeouts::default(),
            viewport: Viewport::default(),
            retries: Retries {
                run_mode: 2,
                open_mode: 0,
            },
            screenshots_folder: PathBuf::from("artifacts/screenshots"),
            videos_folder: PathBuf::from("artifacts/videos"),
            video: true,
            screenshot_on_run_failure: true,
            test_isolation: true,
            browser_args: vec![
                "--disable-popup-blocking".to_string(),
                "--block-new-web-contents".to_string(),
            ],
        }
    }
}

impl SuiteConfig {
    /// Load a configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> PesarResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse a configuration from YAML text
    pub fn parse(raw: &str) -> PesarResult<Self> {
        let config: Self = serde_yaml_ng::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants the rest of the layer relies on
    pub fn validate(&self) -> PesarResult<()> {
        if self.base_url.is_empty() {
            return Err(PesarError::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(PesarError::Config {
                message: "viewport dimensions must be non-zero".to_string(),
            });
        }
        if self.scenario_pattern.is_empty() {
            return Err(PesarError::Config {
                message: "scenario_pattern must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve a scenario path (absolute URLs pass through, paths join base)
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            let base = self.base_url.trim_end_matches('/');
            let path = url.trim_start_matches('/');
            format!("{base}/{path}")
        }
    }
}
