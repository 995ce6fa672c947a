//! Pesar: resilient browser-test command layer for third-party pages
//!
//! Pesar (Spanish: "to weigh") drives an externally hosted BMI/body-fat
//! calculator that cannot be instrumented: ad-saturated, popup-prone markup
//! that changes without notice. Every interaction goes through fuzzy element
//! location, network filtering, and popup dismissal so scenarios assert on
//! page behavior instead of page structure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      PESAR Architecture                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐     ┌─────────────┐     ┌────────────┐          │
//! │   │ Scenario   │     │ Command     │     │ Headless   │          │
//! │   │ (YAML)     │────►│ Layer       │────►│ Browser    │          │
//! │   │            │     │ (locators,  │     │ (chromium) │          │
//! │   └────────────┘     │  waits,     │     └────────────┘          │
//! │                      │  popups,    │            │                │
//! │                      │  blocklist) │     ┌────────────┐          │
//! │                      └─────────────┘     │ Third-party│          │
//! │                             │            │ BMI page   │          │
//! │                      ┌─────────────┐     └────────────┘          │
//! │                      │ Mock page   │  (dry-run backend)          │
//! │                      └─────────────┘                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Secondary interactability and text assertions
pub mod assertions;
mod browser;
mod config;
/// Per-case context: isolation, viewport, benign-exception policy
pub mod context;
mod dom;
mod harness;
/// Fuzzy element location via fallback chains
pub mod locator;
/// In-memory model of the calculator page (dry-run backend)
pub mod mock;
/// Request blocklist: domains, keywords, abort semantics
pub mod network;
/// Page loader: navigate, stabilize, dismiss, settle
pub mod page;
/// Popup dismisser over a probe-and-click surface
pub mod popup;
mod reporter;
mod result;
/// YAML scenarios and the dry-run executor
pub mod scenario;
mod screenshot;
/// Wait mechanisms: stabilization strategies and polling
pub mod wait;
/// The derived calculate-BMI workflow
pub mod workflow;

pub use assertions::{assert_interactable, assert_visible, Interactability, TextExpectation};
pub use browser::{Browser, BrowserConfig, Page};
pub use config::{Retries, RunMode, SuiteConfig, Timeouts, Viewport};
pub use context::{is_benign_exception, ExceptionLog, TestContext, BENIGN_EXCEPTIONS};
pub use dom::{DomSnapshot, ElementSnapshot};
pub use harness::{run_with_retries, SuiteResults, TestCase, TestResult};
pub use locator::{FallbackChain, FormElements, FormRole, Selector, CONTROL_TEXT_PATTERN};
pub use mock::{MockBmiPage, VALIDATION_MESSAGE};
pub use network::{AbortReason, BlockDecision, Blocklist, UrlPattern, AD_KEYWORDS, BLOCKED_DOMAINS};
pub use page::{PageLoader, VisitOptions, VisitStage};
pub use popup::{DismissOutcome, PopupDismisser, PopupSurface, POPUP_SELECTORS, POPUP_SETTLE};
pub use reporter::ConsoleReporter;
pub use result::{PesarError, PesarResult};
pub use scenario::{DryRunExecutor, ScenarioCase, ScenarioDoc, Step};
pub use screenshot::{artifact_path, timestamped_name, write_artifact, ScreenshotOptions};
pub use wait::{
    poll_until, InFlightCounter, StabilizationStrategy, StabilizationWait,
    CALCULATE_WAIT_TIMEOUT_MS, POST_VISIT_SETTLE_MS, STABILIZATION_TIMEOUT_MS,
};
pub use workflow::{calculate_bmi_steps, Unit, WorkflowStep};
