//! Page loader: navigate and settle.
//!
//! `visit_with_setup` composes navigation, the stabilization wait, the popup
//! dismisser, and a final settle pause into one operation. Each stage can be
//! toggled independently. Afterwards the caller may assume the document is
//! rendered and transient overlays are gone, but NOT that all asynchronous
//! network activity has completed; settling is best-effort.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::popup::PopupDismisser;
use crate::wait::{StabilizationWait, POST_VISIT_SETTLE_MS};

/// Recognized navigation options; each independently toggles a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitOptions {
    /// Dismiss transient overlays after the page settles
    pub handle_popups: bool,
    /// Run the stabilization wait after navigation
    pub wait_for_stability: bool,
}

impl Default for VisitOptions {
    fn default() -> Self {
        Self {
            handle_popups: true,
            wait_for_stability: true,
        }
    }
}

impl VisitOptions {
    /// Default options (both stages enabled)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle popup handling
    #[must_use]
    pub const fn with_handle_popups(mut self, enabled: bool) -> Self {
        self.handle_popups = enabled;
        self
    }

    /// Toggle the stabilization wait
    #[must_use]
    pub const fn with_wait_for_stability(mut self, enabled: bool) -> Self {
        self.wait_for_stability = enabled;
        self
    }
}

/// One stage of the visit pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitStage {
    /// Navigate to the target URL
    Navigate,
    /// Assert the body is visible, then settle per the configured strategy
    Stabilize,
    /// Probe and dismiss transient overlays
    DismissPopups,
    /// Fixed final settle pause
    Settle,
}

/// The page loader: stabilization + dismissal + settle configuration
#[derive(Debug, Clone)]
pub struct PageLoader {
    /// Stabilization wait applied after navigation
    pub stabilization: StabilizationWait,
    /// Popup dismisser applied after stabilization
    pub dismisser: PopupDismisser,
    /// Final settle pause
    pub settle: Duration,
}

impl Default for PageLoader {
    fn default() -> Self {
        Self {
            stabilization: StabilizationWait::default(),
            dismisser: PopupDismisser::default(),
            settle: Duration::from_millis(POST_VISIT_SETTLE_MS),
        }
    }
}

impl PageLoader {
    /// Loader with default stabilization and the built-in selector list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stage sequence for a given set of options.
    ///
    /// Navigation always runs; stabilization and dismissal are toggled by
    /// the options; the final settle always runs.
    #[must_use]
    pub fn stages(&self, options: VisitOptions) -> Vec<VisitStage> {
        let mut stages = vec![VisitStage::Navigate];
        if options.wait_for_stability {
            stages.push(VisitStage::Stabilize);
        }
        if options.handle_popups {
            stages.push(VisitStage::DismissPopups);
        }
        stages.push(VisitStage::Settle);
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_enable_both_stages() {
        let options = VisitOptions::default();
        assert!(options.handle_popups);
        assert!(options.wait_for_stability);
    }

    #[test]
    fn test_full_pipeline_order() {
        let loader = PageLoader::new();
        assert_eq!(
            loader.stages(VisitOptions::default()),
            vec![
                VisitStage::Navigate,
                VisitStage::Stabilize,
                VisitStage::DismissPopups,
                VisitStage::Settle,
            ]
        );
    }

    #[test]
    fn test_stages_toggle_independently() {
        let loader = PageLoader::new();

        let no_popups = loader.stages(VisitOptions::new().with_handle_popups(false));
        assert!(!no_popups.contains(&VisitStage::DismissPopups));
        assert!(no_popups.contains(&VisitStage::Stabilize));

        let no_stability = loader.stages(VisitOptions::new().with_wait_for_stability(false));
        assert!(!no_stability.contains(&VisitStage::Stabilize));
        assert!(no_stability.contains(&VisitStage::DismissPopups));
    }

    #[test]
    fn test_navigate_and_settle_always_run() {
        let loader = PageLoader::new();
        let minimal = loader.stages(
            VisitOptions::new()
                .with_handle_popups(false)
                .with_wait_for_stability(false),
        );
        assert_eq!(minimal, vec![VisitStage::Navigate, VisitStage::Settle]);
    }

    #[test]
    fn test_default_settle_interval() {
        assert_eq!(PageLoader::new().settle, Duration::from_millis(1000));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: VisitOptions = serde_yaml_ng::from_str("handle_popups: false\n").unwrap();
        assert!(!options.handle_popups);
        assert!(options.wait_for_stability);
    }
}
