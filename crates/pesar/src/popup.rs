//! Popup dismisser.
//!
//! Probes a fixed, ordered list of candidate selectors against the current
//! document and force-clicks any that are visible, pausing briefly after
//! each click so closing animations settle before the next probe. Selectors
//! are independent: failing to find or click one never aborts the rest.

use std::time::Duration;

use tracing::debug;

/// Candidate selectors for transient overlays, tried in fixed order
pub const POPUP_SELECTORS: [&str; 12] = [
    "[data-testid=\"close-button\"]",
    "[data-testid=\"modal-close\"]",
    ".modal-close",
    ".popup-close",
    ".close-btn",
    "[aria-label=\"Close\"]",
    "[aria-label=\"close\"]",
    "button[title=\"Close\"]",
    ".cookie-banner button",
    "#cookie-accept",
    ".gdpr-accept",
    ".newsletter-popup .close",
];

/// Pause after each dismissal click (closing animations, DOM updates)
pub const POPUP_SETTLE: Duration = Duration::from_millis(500);

/// What happened when one selector was probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissOutcome {
    /// The probed selector
    pub selector: String,
    /// Whether a visible match existed
    pub found: bool,
    /// Whether the forced click went through
    pub clicked: bool,
}

/// A surface the dismisser can probe and click.
///
/// Implemented by the live page backend and by the in-memory mock page;
/// selector semantics belong to the surface, not to this layer.
pub trait PopupSurface {
    /// Whether a visible element matches the selector
    fn is_visible(&self, selector: &str) -> bool;

    /// Forced click, bypassing pointer-event occlusion checks.
    ///
    /// Errors are reported but never propagate past the probe loop.
    fn force_click(&mut self, selector: &str) -> Result<(), String>;
}

/// The popup dismisser: a selector list and a settle pause
#[derive(Debug, Clone)]
pub struct PopupDismisser {
    selectors: Vec<String>,
    settle: Duration,
}

impl Default for PopupDismisser {
    fn default() -> Self {
        Self {
            selectors: POPUP_SELECTORS.iter().map(|s| (*s).to_string()).collect(),
            settle: POPUP_SETTLE,
        }
    }
}

impl PopupDismisser {
    /// Dismisser with the built-in selector list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dismisser with a custom selector list
    #[must_use]
    pub fn with_selectors(selectors: Vec<String>) -> Self {
        Self {
            selectors,
            settle: POPUP_SETTLE,
        }
    }

    /// The probe order
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Pause applied after each successful click
    #[must_use]
    pub const fn settle(&self) -> Duration {
        self.settle
    }

    /// Probe every selector in order against a surface.
    ///
    /// Purely side-effecting; returns per-selector outcomes for logging.
    /// Idempotent: once nothing matching is visible, a second call performs
    /// no clicks.
    pub fn dismiss<S: PopupSurface>(&self, surface: &mut S) -> Vec<DismissOutcome> {
        let mut outcomes = Vec::with_capacity(self.selectors.len());
        for selector in &self.selectors {
            let found = surface.is_visible(selector);
            let clicked = if found {
                match surface.force_click(selector) {
                    Ok(()) => {
                        debug!(selector, "dismissed popup");
                        true
                    }
                    Err(message) => {
                        // Best-effort: keep probing the rest.
                        debug!(selector, message, "popup dismissal failed");
                        false
                    }
                }
            } else {
                false
            };
            outcomes.push(DismissOutcome {
                selector: selector.clone(),
                found,
                clicked,
            });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeSurface {
        visible: HashSet<String>,
        refuse: HashSet<String>,
        clicks: Vec<String>,
    }

    impl FakeSurface {
        fn with_visible(selectors: &[&str]) -> Self {
            Self {
                visible: selectors.iter().map(|s| (*s).to_string()).collect(),
                refuse: HashSet::new(),
                clicks: Vec::new(),
            }
        }
    }

    impl PopupSurface for FakeSurface {
        fn is_visible(&self, selector: &str) -> bool {
            self.visible.contains(selector)
        }

        fn force_click(&mut self, selector: &str) -> Result<(), String> {
            self.clicks.push(selector.to_string());
            if self.refuse.contains(selector) {
                return Err("element detached".to_string());
            }
            self.visible.remove(selector);
            Ok(())
        }
    }

    #[test]
    fn test_visible_popups_are_dismissed() {
        let mut surface = FakeSurface::with_visible(&[".modal-close", "#cookie-accept"]);
        let outcomes = PopupDismisser::new().dismiss(&mut surface);

        let clicked: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.clicked)
            .map(|o| o.selector.as_str())
            .collect();
        assert_eq!(clicked, vec![".modal-close", "#cookie-accept"]);
        assert!(surface.visible.is_empty());
    }

    #[test]
    fn test_probe_order_is_fixed() {
        let mut surface = FakeSurface::with_visible(&[]);
        let outcomes = PopupDismisser::new().dismiss(&mut surface);
        let probed: Vec<&str> = outcomes.iter().map(|o| o.selector.as_str()).collect();
        assert_eq!(probed, POPUP_SELECTORS.to_vec());
    }

    #[test]
    fn test_second_call_is_noop() {
        let mut surface = FakeSurface::with_visible(&[".gdpr-accept"]);
        let dismisser = PopupDismisser::new();

        dismisser.dismiss(&mut surface);
        let second = dismisser.dismiss(&mut surface);
        assert!(second.iter().all(|o| !o.found && !o.clicked));
        assert_eq!(surface.clicks.len(), 1);
    }

    #[test]
    fn test_click_failure_does_not_abort_remaining_probes() {
        let mut surface = FakeSurface::with_visible(&[".modal-close", ".gdpr-accept"]);
        surface.refuse.insert(".modal-close".to_string());

        let outcomes = PopupDismisser::new().dismiss(&mut surface);

        let modal = outcomes
            .iter()
            .find(|o| o.selector == ".modal-close")
            .unwrap();
        assert!(modal.found && !modal.clicked);

        let gdpr = outcomes
            .iter()
            .find(|o| o.selector == ".gdpr-accept")
            .unwrap();
        assert!(gdpr.clicked);
    }

    #[test]
    fn test_settle_duration() {
        assert_eq!(PopupDismisser::new().settle(), Duration::from_millis(500));
    }
}
