//! Element location via fuzzy, markup-tolerant fallback chains.
//!
//! The page under test is third-party: its markup can change without notice.
//! Instead of hard-coded selectors, each semantic form role (height input,
//! weight input, calculate control, result region) resolves through an
//! ordered chain of matching strategies, tried in sequence until one yields a
//! result. Strategies are pure predicates over a [`DomSnapshot`], so the
//! resolution logic is testable without a live browser; each strategy also
//! renders to a DOM query expression for the live backend.
//!
//! Accessors are lazy and re-evaluated on every call. Nothing is memoized:
//! a located element never outlives its assertion chain.

use serde::{Deserialize, Serialize};

use crate::dom::{DomSnapshot, ElementSnapshot};
use crate::result::{PesarError, PesarResult};

/// Text pattern identifying the calculate control (applied case-insensitively)
pub const CONTROL_TEXT_PATTERN: &str = "calculate|compute|submit";

/// Semantic form roles the locator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormRole {
    /// The height input field
    HeightInput,
    /// The weight input field
    WeightInput,
    /// The button-like element that triggers calculation
    CalculateControl,
    /// The region where results are rendered
    ResultRegion,
}

impl FormRole {
    /// Human-readable description, used in not-found conditions
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::HeightInput => "height input (name/id/placeholder containing \"height\")",
            Self::WeightInput => "weight input (name/id/placeholder containing \"weight\")",
            Self::CalculateControl => "calculate control (text matching /calculate|compute|submit/i)",
            Self::ResultRegion => "result region (class/id/data-testid containing \"result\")",
        }
    }
}

/// One matching strategy in a fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// Case-insensitive attribute-substring match.
    ///
    /// Matches the first element in document order whose tag is in `tags`
    /// (empty = any tag) and where any attribute in `attributes` contains
    /// `needle`.
    AttrContains {
        /// Candidate tag names (empty matches any tag)
        tags: Vec<String>,
        /// Attributes to inspect
        attributes: Vec<String>,
        /// Substring to look for, case-insensitively
        needle: String,
    },
    /// A button-like element whose visible text matches a pattern
    ControlText {
        /// Regex applied to visible text (or `value` for submit inputs)
        pattern: String,
    },
    /// A radio input whose `value` attribute contains any of the needles
    RadioValue {
        /// Value substrings, tried case-insensitively
        needles: Vec<String>,
    },
    /// Raw CSS selector, passed through to the live backend.
    ///
    /// Snapshot matching supports only the `#id`, `.class` and bare-tag
    /// forms; anything richer resolves live only.
    Css(String),
}

impl Selector {
    /// Attribute-substring selector over input elements
    #[must_use]
    pub fn input_attr(needle: impl Into<String>) -> Self {
        Self::AttrContains {
            tags: vec!["input".to_string()],
            attributes: vec![
                "name".to_string(),
                "id".to_string(),
                "placeholder".to_string(),
            ],
            needle: needle.into(),
        }
    }

    /// Render to a DOM query expression for the live backend
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::AttrContains {
                tags,
                attributes,
                needle,
            } => {
                let tag_list: Vec<&str> = if tags.is_empty() {
                    vec!["*"]
                } else {
                    tags.iter().map(String::as_str).collect()
                };
                let mut parts = Vec::new();
                for tag in &tag_list {
                    for attr in attributes {
                        parts.push(format!("{tag}[{attr}*=\"{needle}\" i]"));
                    }
                }
                format!("document.querySelector('{}')", parts.join(", "))
            }
            Self::ControlText { pattern } => format!(
                "Array.from(document.querySelectorAll('button, input[type=\"submit\"]'))\
                 .find(el => new RegExp({pattern:?}, 'i').test(el.innerText || el.value || ''))"
            ),
            Self::RadioValue { needles } => {
                let parts: Vec<String> = needles
                    .iter()
                    .map(|n| format!("input[type=\"radio\"][value*=\"{n}\" i]"))
                    .collect();
                format!("document.querySelector('{}')", parts.join(", "))
            }
            Self::Css(css) => format!("document.querySelector({css:?})"),
        }
    }

    /// Pure predicate: does this strategy match the given element?
    #[must_use]
    pub fn matches(&self, el: &ElementSnapshot) -> bool {
        match self {
            Self::AttrContains {
                tags,
                attributes,
                needle,
            } => {
                let tag_ok = tags.is_empty() || tags.iter().any(|t| t == &el.tag);
                tag_ok && attributes.iter().any(|a| el.attr_contains(a, needle))
            }
            Self::ControlText { pattern } => {
                let button_like = el.tag == "button"
                    || (el.tag == "input" && el.attr("type") == Some("submit"));
                if !button_like {
                    return false;
                }
                let text = if el.text.is_empty() {
                    el.attr("value").unwrap_or("")
                } else {
                    el.text.as_str()
                };
                regex::Regex::new(&format!("(?i){pattern}"))
                    .map(|re| re.is_match(text))
                    .unwrap_or(false)
            }
            Self::RadioValue { needles } => {
                el.tag == "input"
                    && el.attr("type") == Some("radio")
                    && needles.iter().any(|n| el.attr_contains("value", n))
            }
            Self::Css(css) => {
                if let Some(id) = css.strip_prefix('#') {
                    el.attr("id") == Some(id)
                } else if let Some(class) = css.strip_prefix('.') {
                    el.attr("class")
                        .is_some_and(|c| c.split_whitespace().any(|part| part == class))
                } else if css.chars().all(|c| c.is_ascii_alphanumeric()) {
                    el.tag == *css
                } else {
                    false
                }
            }
        }
    }

    /// First matching element in document order
    #[must_use]
    pub fn resolve_in<'a>(&self, dom: &'a DomSnapshot) -> Option<&'a ElementSnapshot> {
        dom.find(|el| self.matches(el))
    }
}

/// An ordered list of matching strategies, tried in sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackChain {
    /// Description used in not-found conditions
    pub description: String,
    /// Strategies, in priority order
    pub steps: Vec<Selector>,
}

impl FallbackChain {
    /// Create a chain from strategies
    #[must_use]
    pub fn new(description: impl Into<String>, steps: Vec<Selector>) -> Self {
        Self {
            description: description.into(),
            steps,
        }
    }

    /// First-match-wins resolution over a snapshot
    #[must_use]
    pub fn try_resolve<'a>(&self, dom: &'a DomSnapshot) -> Option<&'a ElementSnapshot> {
        self.steps.iter().find_map(|s| s.resolve_in(dom))
    }

    /// Resolve or fail with a not-found condition naming the expectation
    pub fn resolve<'a>(&self, dom: &'a DomSnapshot) -> PesarResult<&'a ElementSnapshot> {
        self.try_resolve(dom)
            .ok_or_else(|| PesarError::not_found(self.description.clone()))
    }

    /// Query expressions for the live backend, in priority order
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.steps.iter().map(Selector::to_query).collect()
    }
}

/// Lazy accessors for the calculator form.
///
/// Each accessor builds a fresh [`FallbackChain`] on every call; resolution
/// happens at point of use against the current snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormElements;

impl FormElements {
    /// Create the accessor set
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Chain for a semantic role
    #[must_use]
    pub fn chain_for(&self, role: FormRole) -> FallbackChain {
        match role {
            FormRole::HeightInput => FallbackChain::new(
                FormRole::HeightInput.describe(),
                vec![Selector::input_attr("height")],
            ),
            FormRole::WeightInput => FallbackChain::new(
                FormRole::WeightInput.describe(),
                vec![Selector::input_attr("weight")],
            ),
            FormRole::CalculateControl => FallbackChain::new(
                FormRole::CalculateControl.describe(),
                vec![Selector::ControlText {
                    pattern: CONTROL_TEXT_PATTERN.to_string(),
                }],
            ),
            FormRole::ResultRegion => FallbackChain::new(
                FormRole::ResultRegion.describe(),
                vec![Selector::AttrContains {
                    tags: Vec::new(),
                    attributes: vec![
                        "class".to_string(),
                        "id".to_string(),
                        "data-testid".to_string(),
                    ],
                    needle: "result".to_string(),
                }],
            ),
        }
    }

    /// Accessor for the height input
    #[must_use]
    pub fn height_input(&self) -> FallbackChain {
        self.chain_for(FormRole::HeightInput)
    }

    /// Accessor for the weight input
    #[must_use]
    pub fn weight_input(&self) -> FallbackChain {
        self.chain_for(FormRole::WeightInput)
    }

    /// Accessor for the calculate control
    #[must_use]
    pub fn calculate_control(&self) -> FallbackChain {
        self.chain_for(FormRole::CalculateControl)
    }

    /// Accessor for the result region
    #[must_use]
    pub fn result_region(&self) -> FallbackChain {
        self.chain_for(FormRole::ResultRegion)
    }
}
