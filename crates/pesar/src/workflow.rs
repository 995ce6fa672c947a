//! Derived workflow: drive the calculator form end to end.
//!
//! `calculate_bmi` composes the element locator with form filling: clear and
//! fill the height and weight inputs, optionally toggle a unit radio when
//! the page offers one, click the calculate control, then wait (bounded) for
//! the page to settle. The workflow produces no value; callers inspect page
//! state afterwards through separate assertions.

use serde::{Deserialize, Serialize};

use crate::locator::{FormRole, Selector};
use crate::wait::CALCULATE_WAIT_TIMEOUT_MS;

/// Measurement unit system, matched fuzzily against radio values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Metric units (radio value containing "metric" or "si")
    #[default]
    Metric,
    /// Imperial units (radio value containing "imperial" or "us")
    Imperial,
}

impl Unit {
    /// Value substrings identifying this unit's radio control
    #[must_use]
    pub fn value_needles(&self) -> &'static [&'static str] {
        match self {
            Self::Metric => &["metric", "si"],
            Self::Imperial => &["imperial", "us"],
        }
    }

    /// Selector for this unit's radio control
    #[must_use]
    pub fn selector(&self) -> Selector {
        Selector::RadioValue {
            needles: self
                .value_needles()
                .iter()
                .map(|n| (*n).to_string())
                .collect(),
        }
    }

    /// Parse from scenario text ("metric"/"imperial", case-insensitive)
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "metric" | "si" => Some(Self::Metric),
            "imperial" | "us" => Some(Self::Imperial),
            _ => None,
        }
    }
}

/// One step of the BMI workflow, executed strictly in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Clear a located input and type the value
    ClearAndFill {
        /// Target form role
        role: FormRole,
        /// String representation of the value
        value: String,
    },
    /// Check the unit radio if such a control exists; skipped otherwise
    SelectUnit {
        /// Requested unit
        unit: Unit,
    },
    /// Click the located calculate control
    ClickCalculate,
    /// Bounded stabilization wait for the result to render
    AwaitResult {
        /// Wait bound (ms)
        timeout_ms: u64,
    },
}

/// Build the `calculate_bmi` step sequence.
///
/// Values are carried as strings so fractional weights like `53.5` survive
/// verbatim into the form.
#[must_use]
pub fn calculate_bmi_steps(height: &str, weight: &str, unit: Option<Unit>) -> Vec<WorkflowStep> {
    let mut steps = vec![
        WorkflowStep::ClearAndFill {
            role: FormRole::HeightInput,
            value: height.to_string(),
        },
        WorkflowStep::ClearAndFill {
            role: FormRole::WeightInput,
            value: weight.to_string(),
        },
    ];
    if let Some(unit) = unit {
        steps.push(WorkflowStep::SelectUnit { unit });
    }
    steps.push(WorkflowStep::ClickCalculate);
    steps.push(WorkflowStep::AwaitResult {
        timeout_ms: CALCULATE_WAIT_TIMEOUT_MS,
    });
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sequence_order() {
        let steps = calculate_bmi_steps("170", "53.5", Some(Unit::Metric));
        assert_eq!(steps.len(), 5);
        assert!(matches!(
            steps[0],
            WorkflowStep::ClearAndFill {
                role: FormRole::HeightInput,
                ..
            }
        ));
        assert!(matches!(
            steps[1],
            WorkflowStep::ClearAndFill {
                role: FormRole::WeightInput,
                ..
            }
        ));
        assert!(matches!(steps[2], WorkflowStep::SelectUnit { .. }));
        assert!(matches!(steps[3], WorkflowStep::ClickCalculate));
        assert!(matches!(
            steps[4],
            WorkflowStep::AwaitResult { timeout_ms: 5000 }
        ));
    }

    #[test]
    fn test_unit_step_omitted_when_unspecified() {
        let steps = calculate_bmi_steps("170", "70", None);
        assert!(steps
            .iter()
            .all(|s| !matches!(s, WorkflowStep::SelectUnit { .. })));
    }

    #[test]
    fn test_fractional_weight_survives_verbatim() {
        let steps = calculate_bmi_steps("170", "53.5", None);
        assert!(matches!(
            &steps[1],
            WorkflowStep::ClearAndFill { value, .. } if value == "53.5"
        ));
    }

    #[test]
    fn test_unit_needles() {
        assert_eq!(Unit::Imperial.value_needles(), &["imperial", "us"]);
        assert_eq!(Unit::Metric.value_needles(), &["metric", "si"]);
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(Unit::parse("Imperial"), Some(Unit::Imperial));
        assert_eq!(Unit::parse("US"), Some(Unit::Imperial));
        assert_eq!(Unit::parse("metric"), Some(Unit::Metric));
        assert_eq!(Unit::parse("kelvin"), None);
    }

    #[test]
    fn test_unit_selector_matches_fuzzy_values() {
        use crate::dom::ElementSnapshot;
        let radio = ElementSnapshot::new("input")
            .with_attr("type", "radio")
            .with_attr("value", "US-Customary");
        assert!(Unit::Imperial.selector().matches(&radio));
        assert!(!Unit::Metric.selector().matches(&radio));
    }
}
