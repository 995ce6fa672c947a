//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature the backend drives a real Chromium via
//! chromiumoxide: navigation, script evaluation, request interception for
//! the ad blocklist, forced clicks, and screenshots. Without the feature a
//! mock with the same shape keeps the crate compiling and unit-testable.

use crate::config::{RunMode, SuiteConfig, Viewport};
use crate::result::{PesarError, PesarResult};

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport applied to new pages
    pub viewport: Viewport,
    /// Path to a chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Extra launch arguments (popup suppression, ad blocking)
    pub extra_args: Vec<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            chromium_path: None,
            extra_args: Vec::new(),
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Launch configuration derived from a suite configuration
    #[must_use]
    pub fn from_suite(config: &SuiteConfig, mode: RunMode) -> Self {
        Self {
            headless: mode == RunMode::Headless,
            viewport: config.viewport,
            chromium_path: std::env::var("CHROMIUM_PATH").ok(),
            extra_args: config.browser_args.clone(),
            sandbox: true,
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the viewport
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable the sandbox (containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::wildcard_imports,
    clippy::missing_errors_doc,
    clippy::significant_drop_tightening
)]
mod cdp {
    use super::*;
    use crate::context::ExceptionLog;
    use crate::network::{AbortReason, BlockDecision, Blocklist};
    use crate::popup::PopupDismisser;
    use crate::wait::InFlightCounter;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::fetch::{
        ContinueRequestParams, EnableParams as FetchEnableParams, EventRequestPaused,
        FailRequestParams, RequestId,
    };
    use chromiumoxide::cdp::browser_protocol::network::{
        EnableParams as NetworkEnableParams, ErrorReason, EventLoadingFailed,
        EventLoadingFinished,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::{
        EnableParams as RuntimeEnableParams, EventExceptionThrown,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const fn error_reason(reason: AbortReason) -> ErrorReason {
        match reason {
            AbortReason::Failed => ErrorReason::Failed,
            AbortReason::Aborted => ErrorReason::Aborted,
            AbortReason::BlockedByClient => ErrorReason::BlockedByClient,
        }
    }

    enum InterceptCommand {
        Fail(FailRequestParams),
        Continue(ContinueRequestParams),
    }

    /// Resolve a paused request into the interception command to issue
    fn intercept_command(request_id: RequestId, decision: BlockDecision) -> InterceptCommand {
        match decision.abort_reason() {
            Some(reason) => {
                InterceptCommand::Fail(FailRequestParams::new(request_id, error_reason(reason)))
            }
            None => InterceptCommand::Continue(ContinueRequestParams::new(request_id)),
        }
    }

    /// Browser instance with a live CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        #[allow(dead_code)]
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a browser
        pub async fn launch(config: BrowserConfig) -> PesarResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport.width, config.viewport.height)
                .args(config.extra_args.iter().map(String::as_str));

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(|e| PesarError::BrowserLaunch {
                message: e.to_string(),
            })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| PesarError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a fresh page
        pub async fn new_page(&self) -> PesarResult<Page> {
            let browser = self.inner.lock().await;
            let cdp_page =
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| PesarError::PageError {
                        message: e.to_string(),
                    })?;

            Ok(Page {
                url: String::from("about:blank"),
                inner: cdp_page,
            })
        }

        /// The launch configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> PesarResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| PesarError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            Ok(())
        }
    }

    /// A live browser page.
    ///
    /// The CDP handle is internally reference-counted; background tasks
    /// (interception, exception collection) hold their own clones of it
    /// rather than a lock over foreground navigation and evaluation.
    #[derive(Debug)]
    pub struct Page {
        /// Current URL
        pub url: String,
        inner: CdpPage,
    }

    impl Page {
        /// Navigate to a URL
        pub async fn goto(&mut self, url: &str) -> PesarResult<()> {
            self.inner
                .goto(url)
                .await
                .map_err(|e| PesarError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            self.url = url.to_string();
            Ok(())
        }

        /// Evaluate a script and deserialize its value
        pub async fn evaluate<T: serde::de::DeserializeOwned>(
            &self,
            expr: &str,
        ) -> PesarResult<T> {
            let result = self
                .inner
                .evaluate(expr)
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;
            result.into_value().map_err(|e| PesarError::PageError {
                message: e.to_string(),
            })
        }

        /// Install request interception for the blocklist.
        ///
        /// Every paused request is either failed with the configured abort
        /// reason or continued. A continued request counts as in flight
        /// until the browser reports its loading finished or failed; that
        /// accounting feeds the network-idle stabilization strategy. The
        /// interception task runs on its own clone of the CDP handle, so
        /// its commands never wait behind an in-progress navigation.
        pub async fn install_blocklist(
            &self,
            blocklist: Blocklist,
            counter: Arc<InFlightCounter>,
        ) -> PesarResult<()> {
            self.inner
                .execute(NetworkEnableParams::default())
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;
            self.inner
                .execute(FetchEnableParams::default())
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;

            let mut paused = self
                .inner
                .event_listener::<EventRequestPaused>()
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;
            let mut finished = self
                .inner
                .event_listener::<EventLoadingFinished>()
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;
            let mut failed = self
                .inner
                .event_listener::<EventLoadingFailed>()
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;

            let handle = self.inner.clone();
            let in_flight = Arc::clone(&counter);
            tokio::spawn(async move {
                while let Some(event) = paused.next().await {
                    let decision = blocklist.decide(&event.request.url);
                    let outcome = match intercept_command(event.request_id.clone(), decision) {
                        InterceptCommand::Fail(params) => {
                            tracing::debug!(url = %event.request.url, "blocked request");
                            handle.execute(params).await.map(|_| ())
                        }
                        InterceptCommand::Continue(params) => {
                            in_flight.request_started();
                            handle.execute(params).await.map(|_| ())
                        }
                    };
                    if let Err(e) = outcome {
                        tracing::debug!(error = %e, "interception command failed");
                    }
                }
            });

            let loads = Arc::clone(&counter);
            tokio::spawn(async move {
                while finished.next().await.is_some() {
                    loads.request_finished();
                }
            });
            tokio::spawn(async move {
                while failed.next().await.is_some() {
                    counter.request_finished();
                }
            });
            Ok(())
        }

        /// Collect uncaught page exceptions for the lifetime of the page.
        ///
        /// The returned log is drained by the executor between steps, where
        /// the benign-exception policy decides what fails the case.
        pub async fn watch_exceptions(&self) -> PesarResult<ExceptionLog> {
            self.inner
                .execute(RuntimeEnableParams::default())
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;
            let mut events = self
                .inner
                .event_listener::<EventExceptionThrown>()
                .await
                .map_err(|e| PesarError::PageError {
                    message: e.to_string(),
                })?;

            let log = ExceptionLog::new();
            let sink = log.clone();
            tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let details = &event.exception_details;
                    let message = details
                        .exception
                        .as_ref()
                        .and_then(|e| e.description.clone())
                        .unwrap_or_else(|| details.text.clone());
                    sink.push(message);
                }
            });
            Ok(log)
        }

        /// First query expression that resolves to an element
        pub async fn query_exists(&self, query: &str) -> PesarResult<bool> {
            self.evaluate(&format!("Boolean({query})")).await
        }

        /// Forced click through a query expression
        pub async fn force_click(&self, query: &str) -> PesarResult<()> {
            let clicked: bool = self
                .evaluate(&format!(
                    "(() => {{ const el = {query}; if (!el) return false; el.click(); return true; }})()"
                ))
                .await?;
            if clicked {
                Ok(())
            } else {
                Err(PesarError::not_found(query.to_string()))
            }
        }

        /// Clear an input located by a query expression and type a value
        pub async fn clear_and_fill(&self, query: &str, value: &str) -> PesarResult<()> {
            let filled: bool = self
                .evaluate(&format!(
                    "(() => {{ const el = {query}; if (!el) return false; \
                     el.value = ''; el.value = {value:?}; \
                     el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                     el.dispatchEvent(new Event('change', {{bubbles: true}})); \
                     return true; }})()"
                ))
                .await?;
            if filled {
                Ok(())
            } else {
                Err(PesarError::not_found(query.to_string()))
            }
        }

        /// Probe and dismiss transient overlays.
        ///
        /// Selectors are independent; a probe that errors mid re-render is
        /// treated as not visible and the remaining selectors still run.
        pub async fn dismiss_popups(&self, dismisser: &PopupDismisser) -> PesarResult<()> {
            for selector in dismisser.selectors() {
                let visible = match self
                    .evaluate::<bool>(&format!(
                        "(() => {{ const el = document.querySelector({selector:?}); \
                         return Boolean(el && el.offsetParent !== null); }})()"
                    ))
                    .await
                {
                    Ok(visible) => visible,
                    Err(e) => {
                        tracing::debug!(selector, error = %e, "popup probe failed");
                        false
                    }
                };
                if visible {
                    // Best-effort; a vanished popup is a success.
                    if let Err(e) = self
                        .force_click(&format!("document.querySelector({selector:?})"))
                        .await
                    {
                        tracing::debug!(selector, error = %e, "popup dismissal failed");
                    }
                    tokio::time::sleep(dismisser.settle()).await;
                }
            }
            Ok(())
        }

        /// Clear cookies and local storage (test isolation)
        pub async fn clear_storage(&self) -> PesarResult<()> {
            let _: bool = self
                .evaluate(
                    "(() => { localStorage.clear(); sessionStorage.clear(); return true; })()",
                )
                .await?;
            Ok(())
        }

        /// Capture a PNG screenshot
        pub async fn screenshot(&self) -> PesarResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = self
                .inner
                .execute(params)
                .await
                .map_err(|e| PesarError::Screenshot {
                    message: e.to_string(),
                })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|e| PesarError::Screenshot {
                    message: e.to_string(),
                })
        }

        /// Current URL
        #[must_use]
        pub fn current_url(&self) -> &str {
            &self.url
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn request_id(raw: &str) -> RequestId {
            serde_json::from_value(serde_json::Value::String(raw.to_string()))
                .expect("request id")
        }

        #[test]
        fn test_blocked_decision_fails_the_request() {
            let command = intercept_command(request_id("r-1"), BlockDecision::ForceNetworkError);
            assert!(matches!(command, InterceptCommand::Fail(_)));
        }

        #[test]
        fn test_keyword_decision_aborts_the_request() {
            let command = intercept_command(request_id("r-2"), BlockDecision::Destroy);
            assert!(matches!(command, InterceptCommand::Fail(_)));
        }

        #[test]
        fn test_allowed_decision_continues_the_request() {
            let command = intercept_command(request_id("r-3"), BlockDecision::Allow);
            assert!(matches!(command, InterceptCommand::Continue(_)));
        }
    }
}

// ============================================================================
// Mock Implementation (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
#[allow(clippy::missing_const_for_fn, clippy::unused_self)]
mod mock {
    use super::{BrowserConfig, PesarError, PesarResult};

    /// Browser instance (mock when the `browser` feature is disabled)
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
    }

    impl Browser {
        /// Launch a browser (mock)
        pub fn launch(config: BrowserConfig) -> PesarResult<Self> {
            Ok(Self { config })
        }

        /// Open a fresh page (mock)
        pub fn new_page(&self) -> PesarResult<Page> {
            Ok(Page {
                url: String::from("about:blank"),
            })
        }

        /// The launch configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }
    }

    /// A browser page (mock when the `browser` feature is disabled)
    #[derive(Debug)]
    pub struct Page {
        /// Current URL
        pub url: String,
    }

    impl Page {
        /// Navigate to a URL (mock)
        pub fn goto(&mut self, url: &str) -> PesarResult<()> {
            self.url = url.to_string();
            Ok(())
        }

        /// Evaluate a script (always errors in mock mode)
        pub fn evaluate<T: serde::de::DeserializeOwned>(&self, _expr: &str) -> PesarResult<T> {
            Err(PesarError::PageError {
                message: "Browser feature not enabled. Enable 'browser' for live CDP support."
                    .to_string(),
            })
        }

        /// Capture a screenshot (empty in mock mode)
        pub fn screenshot(&self) -> PesarResult<Vec<u8>> {
            Ok(vec![])
        }

        /// Current URL
        #[must_use]
        pub fn current_url(&self) -> &str {
            &self.url
        }
    }
}

// Re-export based on feature
#[cfg(feature = "browser")]
pub use cdp::{Browser, Page};

#[cfg(not(feature = "browser"))]
pub use mock::{Browser, Page};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_derived_config() {
        let suite = SuiteConfig::default();
        let config = BrowserConfig::from_suite(&suite, RunMode::Headless);
        assert!(config.headless);
        assert_eq!(config.viewport.width, 1280);
        assert!(config
            .extra_args
            .iter()
            .any(|a| a == "--disable-popup-blocking"));
    }

    #[test]
    fn test_interactive_mode_is_headed() {
        let suite = SuiteConfig::default();
        let config = BrowserConfig::from_suite(&suite, RunMode::Interactive);
        assert!(!config.headless);
    }

    #[test]
    fn test_builder_toggles() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_mock_page_navigation() {
        let browser = Browser::launch(BrowserConfig::default()).unwrap();
        let mut page = browser.new_page().unwrap();
        page.goto("https://practice.expandtesting.com/bmi-calculator")
            .unwrap();
        assert!(page.current_url().ends_with("/bmi-calculator"));
    }
}
