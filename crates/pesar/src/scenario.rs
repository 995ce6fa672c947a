//! YAML-driven scenarios.
//!
//! A scenario file describes one suite: a list of named cases, each a strict
//! sequence of steps. Steps cover the whole command surface — navigation with
//! popup handling, form interaction, the derived BMI workflow, assertions,
//! and screenshots.
//!
//! # Example
//!
//! ```yaml
//! version: "1.0"
//! name: "bmi"
//! cases:
//!   - name: "calculates BMI for height and weight"
//!     steps:
//!       - type: visit
//!         url: "/bmi-calculator"
//!       - type: calculate_bmi
//!         height: "190"
//!         weight: "70"
//!       - type: expect_contains
//!         text: "19.4 kg/m2"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assertions::{assert_interactable, TextExpectation};
use crate::config::SuiteConfig;
use crate::dom::ElementSnapshot;
use crate::locator::{FormElements, FormRole, Selector};
use crate::mock::MockBmiPage;
use crate::page::{PageLoader, VisitOptions, VisitStage};
use crate::popup::PopupDismisser;
use crate::result::{PesarError, PesarResult};
use crate::screenshot::timestamped_name;
use crate::workflow::{calculate_bmi_steps, Unit, WorkflowStep};

/// A parsed scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDoc {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: String,
    /// Suite name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Cases, run in file order
    #[serde(default)]
    pub cases: Vec<ScenarioCase>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// One named case within a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCase {
    /// Case name
    pub name: String,
    /// Steps, executed strictly in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// Navigate to a path or URL, with popup handling and stabilization
    #[serde(rename = "visit")]
    Visit {
        /// Path (resolved against the base URL) or absolute URL
        url: String,
        /// Navigation options
        #[serde(default)]
        options: VisitOptions,
    },
    /// Clear and fill an input
    #[serde(rename = "fill")]
    Fill {
        /// Field name ("height"/"weight" resolve fuzzily, others by id)
        field: String,
        /// Value to type
        value: String,
    },
    /// Choose a dropdown option
    #[serde(rename = "select")]
    Select {
        /// Select element id
        field: String,
        /// Option to choose
        value: String,
    },
    /// The full derived workflow: fill, optional unit, click, await result
    #[serde(rename = "calculate_bmi")]
    CalculateBmi {
        /// Height value, verbatim
        height: String,
        /// Weight value, verbatim
        weight: String,
        /// Optional unit system ("metric"/"imperial")
        #[serde(default)]
        unit: Option<String>,
    },
    /// Click the calculate control without refilling the form
    #[serde(rename = "click_calculate")]
    ClickCalculate,
    /// Assert the page's visible text contains a fragment
    #[serde(rename = "expect_contains")]
    ExpectContains {
        /// Expected fragment
        text: String,
    },
    /// Assert an element's text matches a regex
    #[serde(rename = "expect_matches")]
    ExpectMatches {
        /// CSS selector of the element
        target: String,
        /// Regex the element text must match
        pattern: String,
    },
    /// Assert an element exists and is visible
    #[serde(rename = "expect_visible")]
    ExpectVisible {
        /// CSS selector of the element
        target: String,
    },
    /// Assert an element is absent or hidden
    #[serde(rename = "expect_not_visible")]
    ExpectNotVisible {
        /// CSS selector of the element
        target: String,
    },
    /// Assert a form field is visible, enabled, and accepts pointer events
    #[serde(rename = "expect_interactable")]
    ExpectInteractable {
        /// Field name ("height"/"weight" resolve fuzzily, others by id)
        field: String,
    },
    /// Capture a named, timestamped screenshot
    #[serde(rename = "screenshot")]
    Screenshot {
        /// Artifact base name
        name: String,
    },
}

impl ScenarioDoc {
    /// Parse a scenario from YAML text
    pub fn parse(yaml: &str) -> PesarResult<Self> {
        let doc: Self = serde_yaml_ng::from_str(yaml)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Load and parse a scenario file
    pub fn load(path: &Path) -> PesarResult<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| PesarError::scenario(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&yaml)
    }

    fn validate(&self) -> PesarResult<()> {
        if self.name.is_empty() {
            return Err(PesarError::scenario("scenario name is empty"));
        }
        for case in &self.cases {
            if case.name.is_empty() {
                return Err(PesarError::scenario(format!(
                    "scenario '{}' has a case with no name",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Runs scenario cases against the in-memory page model.
///
/// Waits collapse to no-ops (the model renders synchronously) and
/// screenshots are recorded by name instead of written to disk, so a dry run
/// validates scenario structure, locator resolution, and every assertion
/// without launching a browser.
#[derive(Debug)]
pub struct DryRunExecutor {
    config: SuiteConfig,
    page: MockBmiPage,
    elements: FormElements,
    /// Screenshot artifact names recorded during the run
    pub artifacts: Vec<String>,
}

impl DryRunExecutor {
    /// Executor over a fresh page model
    #[must_use]
    pub fn new(config: SuiteConfig) -> Self {
        Self::with_page(config, MockBmiPage::new())
    }

    /// Executor over a prepared page model
    #[must_use]
    pub fn with_page(config: SuiteConfig, page: MockBmiPage) -> Self {
        Self {
            config,
            page,
            elements: FormElements::new(),
            artifacts: Vec::new(),
        }
    }

    /// Run every step of a case, stopping at the first failure
    pub fn run_case(&mut self, case: &ScenarioCase) -> PesarResult<()> {
        for step in &case.steps {
            self.run_step(step)?;
        }
        Ok(())
    }

    /// Execute a single step
    pub fn run_step(&mut self, step: &Step) -> PesarResult<()> {
        match step {
            Step::Visit { url, options } => self.visit(url, *options),
            Step::Fill { field, value } => self.fill(field, value),
            Step::Select { field, value } => self
                .page
                .select(field, value)
                .map_err(PesarError::not_found),
            Step::CalculateBmi {
                height,
                weight,
                unit,
            } => {
                let unit = match unit.as_deref() {
                    Some(raw) => Some(
                        Unit::parse(raw)
                            .ok_or_else(|| PesarError::scenario(format!("unknown unit: {raw}")))?,
                    ),
                    None => None,
                };
                for step in calculate_bmi_steps(height, weight, unit) {
                    self.run_workflow_step(&step)?;
                }
                Ok(())
            }
            Step::ClickCalculate => self.run_workflow_step(&WorkflowStep::ClickCalculate),
            Step::ExpectContains { text } => {
                TextExpectation::Contains(text.clone()).validate(&self.page.body_text())
            }
            Step::ExpectMatches { target, pattern } => {
                let dom = self.page.dom();
                let el = Selector::Css(target.clone())
                    .resolve_in(&dom)
                    .ok_or_else(|| PesarError::not_found(target.clone()))?;
                TextExpectation::Matches(pattern.clone()).validate(&el.text)
            }
            Step::ExpectVisible { target } => {
                let dom = self.page.dom();
                let el = Selector::Css(target.clone())
                    .resolve_in(&dom)
                    .ok_or_else(|| PesarError::not_found(target.clone()))?;
                if el.visible {
                    Ok(())
                } else {
                    Err(PesarError::assertion(
                        format!("{target} visible"),
                        "hidden",
                    ))
                }
            }
            Step::ExpectNotVisible { target } => {
                let dom = self.page.dom();
                match Selector::Css(target.clone()).resolve_in(&dom) {
                    Some(el) if el.visible => Err(PesarError::assertion(
                        format!("{target} absent or hidden"),
                        "visible",
                    )),
                    _ => Ok(()),
                }
            }
            Step::ExpectInteractable { field } => {
                let dom = self.page.dom();
                let el = self.resolve_field(&dom, field)?;
                assert_interactable(el)
            }
            Step::Screenshot { name } => {
                self.artifacts
                    .push(timestamped_name(name, chrono::Utc::now()));
                Ok(())
            }
        }
    }

    fn visit(&mut self, url: &str, options: VisitOptions) -> PesarResult<()> {
        let resolved = self.config.resolve_url(url);
        let loader = PageLoader::new();
        for stage in loader.stages(options) {
            match stage {
                VisitStage::Navigate => self.page.visit(&resolved),
                VisitStage::DismissPopups => {
                    PopupDismisser::new().dismiss(&mut self.page);
                }
                // The model renders synchronously.
                VisitStage::Stabilize | VisitStage::Settle => {}
            }
        }
        Ok(())
    }

    fn fill(&mut self, field: &str, value: &str) -> PesarResult<()> {
        let dom = self.page.dom();
        let id = {
            let el = self.resolve_field(&dom, field)?;
            el.attr("id")
                .ok_or_else(|| PesarError::not_found(format!("{field} with an id")))?
                .to_string()
        };
        self.page.fill(&id, value).map_err(PesarError::not_found)
    }

    fn run_workflow_step(&mut self, step: &WorkflowStep) -> PesarResult<()> {
        match step {
            WorkflowStep::ClearAndFill { role, value } => {
                let dom = self.page.dom();
                let id = {
                    let el = self.elements.chain_for(*role).resolve(&dom)?;
                    el.attr("id")
                        .ok_or_else(|| PesarError::not_found(role.describe()))?
                        .to_string()
                };
                self.page.fill(&id, value).map_err(PesarError::not_found)
            }
            // Skipped when the page has no unit controls.
            WorkflowStep::SelectUnit { unit } => {
                let dom = self.page.dom();
                if unit.selector().resolve_in(&dom).is_some() {
                    tracing::debug!(?unit, "unit radio selected");
                }
                Ok(())
            }
            WorkflowStep::ClickCalculate => {
                let dom = self.page.dom();
                let control = self.elements.calculate_control().resolve(&dom)?;
                assert_interactable(control)?;
                self.page.click_calculate();
                Ok(())
            }
            WorkflowStep::AwaitResult { .. } => Ok(()),
        }
    }

    fn resolve_field<'a>(
        &self,
        dom: &'a crate::dom::DomSnapshot,
        field: &str,
    ) -> PesarResult<&'a ElementSnapshot> {
        match field {
            "height" => self.elements.chain_for(FormRole::HeightInput).resolve(dom),
            "weight" => self.elements.chain_for(FormRole::WeightInput).resolve(dom),
            other => Selector::Css(format!("#{other}"))
                .resolve_in(dom)
                .ok_or_else(|| PesarError::not_found(format!("#{other}"))),
        }
    }

    /// The page model, for inspection after a run
    #[must_use]
    pub fn page(&self) -> &MockBmiPage {
        &self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> DryRunExecutor {
        DryRunExecutor::new(SuiteConfig::default())
    }

    fn case(yaml: &str) -> ScenarioCase {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_minimal_scenario() {
        let doc = ScenarioDoc::parse(
            r#"
name: "bmi"
cases:
  - name: "default form"
    steps:
      - type: visit
        url: "/bmi-calculator"
      - type: click_calculate
      - type: expect_contains
        text: "19.4 kg/m2"
"#,
        )
        .unwrap();
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.cases.len(), 1);
        assert_eq!(doc.cases[0].steps.len(), 3);
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let err = ScenarioDoc::parse("name: \"\"\ncases: []").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_default_form_dry_run() {
        let mut ex = executor();
        let case = case(
            r#"
name: "default"
steps:
  - type: visit
    url: "/bmi-calculator"
  - type: click_calculate
  - type: expect_contains
    text: "19.4 kg/m2"
"#,
        );
        ex.run_case(&case).unwrap();
    }

    #[test]
    fn test_calculate_bmi_workflow_step() {
        let mut ex = executor();
        let case = case(
            r#"
name: "underweight boundary"
steps:
  - type: visit
    url: "/bmi-calculator"
  - type: calculate_bmi
    height: "170"
    weight: "53.5"
  - type: expect_contains
    text: "18.5"
"#,
        );
        ex.run_case(&case).unwrap();
    }

    #[test]
    fn test_validation_path() {
        let mut ex = executor();
        let case = case(
            r##"
name: "zero height"
steps:
  - type: visit
    url: "/bmi-calculator"
  - type: fill
    field: "height"
    value: "0"
  - type: click_calculate
  - type: expect_contains
    text: "Please provide all the necessary information!"
  - type: expect_not_visible
    target: "#BMI"
"##,
        );
        ex.run_case(&case).unwrap();
    }

    #[test]
    fn test_expect_matches_body_fat_format() {
        let mut ex = executor();
        let case = case(
            r##"
name: "body fat format"
steps:
  - type: visit
    url: "/bmi-calculator"
  - type: fill
    field: "age"
    value: "30"
  - type: select
    field: "gender"
    value: "Male"
  - type: click_calculate
  - type: expect_matches
    target: "#bfat"
    pattern: 'Your Body Fat is \d+\.\d'
"##,
        );
        ex.run_case(&case).unwrap();
    }

    #[test]
    fn test_failed_assertion_stops_the_case() {
        let mut ex = executor();
        let case = case(
            r#"
name: "wrong expectation"
steps:
  - type: visit
    url: "/bmi-calculator"
  - type: click_calculate
  - type: expect_contains
    text: "99.9 kg/m2"
"#,
        );
        let err = ex.run_case(&case).unwrap_err();
        assert!(err.to_string().contains("99.9"));
    }

    #[test]
    fn test_interactability_check() {
        let mut ex = executor();
        let case = case(
            r#"
name: "form is usable"
steps:
  - type: visit
    url: "/bmi-calculator"
  - type: expect_interactable
    field: "height"
  - type: expect_interactable
    field: "weight"
"#,
        );
        ex.run_case(&case).unwrap();
    }

    #[test]
    fn test_screenshot_records_timestamped_artifact() {
        let mut ex = executor();
        ex.run_step(&Step::Screenshot {
            name: "bmi-result".to_string(),
        })
        .unwrap();
        assert_eq!(ex.artifacts.len(), 1);
        assert!(ex.artifacts[0].starts_with("bmi-result-"));
        assert!(!ex.artifacts[0].contains(':'));
    }

    #[test]
    fn test_visit_dismisses_popups() {
        let page = MockBmiPage::new().with_popup(".modal-close");
        let mut ex = DryRunExecutor::with_page(SuiteConfig::default(), page);
        ex.run_step(&Step::Visit {
            url: "/bmi-calculator".to_string(),
            options: VisitOptions::default(),
        })
        .unwrap();
        assert!(!crate::popup::PopupSurface::is_visible(
            ex.page(),
            ".modal-close"
        ));
    }

    #[test]
    fn test_unknown_unit_is_a_scenario_error() {
        let mut ex = executor();
        let err = ex
            .run_step(&Step::CalculateBmi {
                height: "170".to_string(),
                weight: "70".to_string(),
                unit: Some("kelvin".to_string()),
            })
            .unwrap_err();
        assert!(err.to_string().contains("kelvin"));
    }
}
