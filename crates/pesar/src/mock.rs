//! In-memory model of the calculator page.
//!
//! `MockBmiPage` mimics the observable behavior of the hosted BMI/body-fat
//! page: pre-filled defaults, input validation, rounding to one decimal, and
//! visibility of the result regions. It backs `--dry-run` execution and the
//! browserless tests; the command layer treats it exactly like a live page,
//! rebuilding a [`DomSnapshot`] at every point of use.

use crate::dom::{DomSnapshot, ElementSnapshot};
use crate::popup::PopupSurface;

/// Validation message the page renders on missing/implausible inputs
pub const VALIDATION_MESSAGE: &str = "Please provide all the necessary information!";

/// The page rejects inputs below these bounds
const MIN_AGE: f64 = 5.0;
const MIN_HEIGHT_CM: f64 = 50.0;
const MIN_WEIGHT_KG: f64 = 20.0;

/// In-memory calculator page
#[derive(Debug, Clone)]
pub struct MockBmiPage {
    /// Current URL
    pub url: String,
    age: String,
    height: String,
    weight: String,
    gender: String,
    bmi_text: Option<String>,
    bfat_text: Option<String>,
    validation: bool,
    visible_popups: Vec<String>,
}

impl Default for MockBmiPage {
    fn default() -> Self {
        Self {
            url: String::new(),
            age: "35".to_string(),
            height: "190".to_string(),
            weight: "70".to_string(),
            gender: "Female".to_string(),
            bmi_text: None,
            bfat_text: None,
            validation: false,
            visible_popups: Vec::new(),
        }
    }
}

impl MockBmiPage {
    /// Fresh page with the form's pre-filled defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a popup that is visible after navigation
    #[must_use]
    pub fn with_popup(mut self, selector: impl Into<String>) -> Self {
        self.visible_popups.push(selector.into());
        self
    }

    /// Navigate: reset the form and results to their initial state
    pub fn visit(&mut self, url: &str) {
        let popups = self.visible_popups.clone();
        *self = Self::default();
        self.url = url.to_string();
        self.visible_popups = popups;
    }

    /// Clear and fill a field by id
    pub fn fill(&mut self, field: &str, value: &str) -> Result<(), String> {
        match field {
            "age" => self.age = value.to_string(),
            "height" => self.height = value.to_string(),
            "weight" => self.weight = value.to_string(),
            other => return Err(format!("no such input: #{other}")),
        }
        Ok(())
    }

    /// Select an option in a dropdown by id
    pub fn select(&mut self, field: &str, value: &str) -> Result<(), String> {
        if field == "gender" {
            self.gender = value.to_string();
            Ok(())
        } else {
            Err(format!("no such select: #{field}"))
        }
    }

    /// Click the Calculate button
    pub fn click_calculate(&mut self) {
        let age = self.age.parse::<f64>().unwrap_or(0.0);
        let height = self.height.parse::<f64>().unwrap_or(0.0);
        let weight = self.weight.parse::<f64>().unwrap_or(0.0);

        if age < MIN_AGE || height < MIN_HEIGHT_CM || weight < MIN_WEIGHT_KG {
            self.validation = true;
            self.bmi_text = None;
            self.bfat_text = None;
            return;
        }

        self.validation = false;
        let meters = height / 100.0;
        let bmi = weight / (meters * meters);
        self.bmi_text = Some(format!("Your BMI is {bmi:.1} kg/m2"));

        // Deurenberg estimate; the page displays one decimal place.
        let sex = if self.gender.eq_ignore_ascii_case("male") {
            1.0
        } else {
            0.0
        };
        let bfat = 1.20 * bmi + 0.23 * age - 10.8 * sex - 5.4;
        self.bfat_text = Some(format!("Your Body Fat is {bfat:.1}"));
    }

    /// Snapshot of the current document, rebuilt on every call
    #[must_use]
    pub fn dom(&self) -> DomSnapshot {
        let mut dom = DomSnapshot::new();

        dom.push(
            ElementSnapshot::new("input")
                .with_attr("id", "age")
                .with_attr("name", "age")
                .with_attr("placeholder", "Age")
                .with_attr("value", &self.age),
        );
        dom.push(
            ElementSnapshot::new("input")
                .with_attr("id", "height")
                .with_attr("name", "height")
                .with_attr("placeholder", "Height in cm")
                .with_attr("value", &self.height),
        );
        dom.push(
            ElementSnapshot::new("input")
                .with_attr("id", "weight")
                .with_attr("name", "weight")
                .with_attr("placeholder", "Weight in kg")
                .with_attr("value", &self.weight),
        );
        dom.push(
            ElementSnapshot::new("select")
                .with_attr("id", "gender")
                .with_attr("name", "gender")
                .with_attr("value", &self.gender),
        );
        dom.push(ElementSnapshot::new("button").with_text("Calculate"));

        let mut bmi = ElementSnapshot::new("div")
            .with_attr("id", "BMI")
            .with_attr("class", "result")
            .with_attr("data-testid", "bmi-result");
        match &self.bmi_text {
            Some(text) => bmi = bmi.with_text(text.clone()),
            None => bmi = bmi.hidden(),
        }
        dom.push(bmi);

        let mut bfat = ElementSnapshot::new("div")
            .with_attr("id", "bfat")
            .with_attr("class", "result");
        match &self.bfat_text {
            Some(text) => bfat = bfat.with_text(text.clone()),
            None => bfat = bfat.hidden(),
        }
        dom.push(bfat);

        let mut error = ElementSnapshot::new("div").with_attr("class", "error-message");
        if self.validation {
            error = error.with_text(VALIDATION_MESSAGE);
        } else {
            error = error.hidden();
        }
        dom.push(error);

        dom
    }

    /// All visible text on the page, for contains-text assertions
    #[must_use]
    pub fn body_text(&self) -> String {
        self.dom()
            .elements
            .iter()
            .filter(|el| el.visible && !el.text.is_empty())
            .map(|el| el.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Current value of an input by id
    #[must_use]
    pub fn value_of(&self, field: &str) -> Option<&str> {
        match field {
            "age" => Some(&self.age),
            "height" => Some(&self.height),
            "weight" => Some(&self.weight),
            "gender" => Some(&self.gender),
            _ => None,
        }
    }
}

impl PopupSurface for MockBmiPage {
    fn is_visible(&self, selector: &str) -> bool {
        self.visible_popups.iter().any(|s| s == selector)
    }

    fn force_click(&mut self, selector: &str) -> Result<(), String> {
        self.visible_popups.retain(|s| s != selector);
        Ok(())
    }
}
