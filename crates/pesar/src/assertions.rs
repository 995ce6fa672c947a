//! Secondary checks layered onto a located element.
//!
//! `assert_interactable` verifies, in sequence, that an element is visible,
//! not disabled, and receives pointer events. The first failing check aborts
//! with a descriptive condition; the remaining checks are not evaluated.

use crate::dom::ElementSnapshot;
use crate::result::{PesarError, PesarResult};

/// The three interactability conditions, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactability {
    /// Element is rendered and visible
    Visible,
    /// Element does not carry the disabled state
    Enabled,
    /// Computed pointer-events style is not `none`
    PointerEvents,
}

impl Interactability {
    /// Evaluation order of the conditions
    pub const ORDER: [Self; 3] = [Self::Visible, Self::Enabled, Self::PointerEvents];

    /// Condition description for failure messages
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Visible => "element is visible",
            Self::Enabled => "element is not disabled",
            Self::PointerEvents => "element has pointer-events enabled",
        }
    }

    /// Check one condition against an element
    #[must_use]
    pub fn holds(&self, el: &ElementSnapshot) -> bool {
        match self {
            Self::Visible => el.visible,
            Self::Enabled => !el.disabled,
            Self::PointerEvents => el.pointer_events_enabled(),
        }
    }
}

/// Assert that an element is visible, enabled and receives pointer events.
///
/// Conditions are checked in order; the first violation aborts with an
/// assertion failure naming the condition.
pub fn assert_interactable(el: &ElementSnapshot) -> PesarResult<()> {
    for condition in Interactability::ORDER {
        if !condition.holds(el) {
            return Err(PesarError::assertion(
                condition.describe(),
                describe_state(el),
            ));
        }
    }
    Ok(())
}

/// Assert that an element is visible
pub fn assert_visible(el: &ElementSnapshot) -> PesarResult<()> {
    if el.visible {
        Ok(())
    } else {
        Err(PesarError::assertion(
            "element is visible",
            describe_state(el),
        ))
    }
}

/// Short state description for expected-vs-actual diffs
fn describe_state(el: &ElementSnapshot) -> String {
    format!(
        "<{}> visible={} disabled={} pointer-events={}",
        el.tag, el.visible, el.disabled, el.pointer_events
    )
}

/// A text expectation against observed page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextExpectation {
    /// Observed text contains the expected substring
    Contains(String),
    /// Observed text matches the regex pattern
    Matches(String),
}

impl TextExpectation {
    /// Validate against observed text
    pub fn validate(&self, actual: &str) -> PesarResult<()> {
        match self {
            Self::Contains(expected) => {
                if actual.contains(expected) {
                    Ok(())
                } else {
                    Err(PesarError::assertion(
                        format!("text containing {expected:?}"),
                        format!("{actual:?}"),
                    ))
                }
            }
            Self::Matches(pattern) => {
                let re = regex::Regex::new(pattern)
                    .map_err(|e| PesarError::scenario(format!("invalid pattern {pattern:?}: {e}")))?;
                if re.is_match(actual) {
                    Ok(())
                } else {
                    Err(PesarError::assertion(
                        format!("text matching /{pattern}/"),
                        format!("{actual:?}"),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSnapshot;

    #[test]
    fn test_interactable_element_passes() {
        let el = ElementSnapshot::new("button").with_text("Calculate");
        assert!(assert_interactable(&el).is_ok());
    }

    #[test]
    fn test_hidden_element_fails_on_visibility() {
        let el = ElementSnapshot::new("button").hidden();
        let err = assert_interactable(&el).unwrap_err();
        assert!(err.to_string().contains("visible"));
    }

    #[test]
    fn test_disabled_element_fails_on_enabled_check() {
        let el = ElementSnapshot::new("button").disabled();
        let err = assert_interactable(&el).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_pointer_events_none_fails_last() {
        let el = ElementSnapshot::new("button").with_pointer_events("none");
        let err = assert_interactable(&el).unwrap_err();
        assert!(err.to_string().contains("pointer-events"));
    }

    #[test]
    fn test_first_violation_wins() {
        // Hidden AND disabled: the visibility check comes first.
        let el = ElementSnapshot::new("button").hidden().disabled();
        let err = assert_interactable(&el).unwrap_err();
        assert!(err.to_string().contains("visible"));
        assert!(!err.to_string().contains("pointer-events enabled"));
    }

    #[test]
    fn test_contains_expectation() {
        let exp = TextExpectation::Contains("18.5".to_string());
        assert!(exp.validate("Your BMI is 18.5 kg/m2").is_ok());
        assert!(exp.validate("Your BMI is 17.3 kg/m2").is_err());
    }

    #[test]
    fn test_matches_expectation() {
        let exp = TextExpectation::Matches(r"Your Body Fat is \d+\.\d".to_string());
        assert!(exp.validate("Your Body Fat is 30.5").is_ok());
        assert!(exp.validate("Your Body Fat is pending").is_err());
    }
}
