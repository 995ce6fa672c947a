//! DOM snapshot model.
//!
//! Locator predicates run against a point-in-time snapshot of the document:
//! a flat list of elements in document order, each carrying the attributes
//! and computed state the command layer cares about. Snapshots are cheap,
//! rebuilt at every point of use, and never cached across commands, so a
//! re-rendering page cannot leave the layer holding a stale handle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One element in a DOM snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lower-cased tag name
    pub tag: String,
    /// Attribute map (`name`, `id`, `placeholder`, `class`, `data-testid`, ...)
    pub attributes: BTreeMap<String, String>,
    /// Visible text content
    pub text: String,
    /// Whether the element is rendered and visible
    pub visible: bool,
    /// Whether the element carries the `disabled` state
    pub disabled: bool,
    /// Computed `pointer-events` style
    pub pointer_events: String,
}

impl ElementSnapshot {
    /// Create a visible, enabled element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            visible: true,
            disabled: false,
            pointer_events: "auto".to_string(),
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the visible text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark the element hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark the element disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set the computed pointer-events style
    #[must_use]
    pub fn with_pointer_events(mut self, value: impl Into<String>) -> Self {
        self.pointer_events = value.into();
        self
    }

    /// Get an attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Case-insensitive substring check against one attribute
    #[must_use]
    pub fn attr_contains(&self, name: &str, needle: &str) -> bool {
        self.attr(name)
            .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
    }

    /// Whether the element accepts pointer interaction
    #[must_use]
    pub fn pointer_events_enabled(&self) -> bool {
        self.pointer_events != "none"
    }
}

/// A point-in-time snapshot of the document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomSnapshot {
    /// Elements in document order
    pub elements: Vec<ElementSnapshot>,
}

impl DomSnapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element (document order)
    pub fn push(&mut self, element: ElementSnapshot) {
        self.elements.push(element);
    }

    /// First element satisfying the predicate, in document order
    pub fn find<'a, P>(&'a self, mut predicate: P) -> Option<&'a ElementSnapshot>
    where
        P: FnMut(&ElementSnapshot) -> bool,
    {
        self.elements.iter().find(|el| predicate(el))
    }

    /// All elements satisfying the predicate, in document order
    pub fn find_all<'a, P>(&'a self, mut predicate: P) -> Vec<&'a ElementSnapshot>
    where
        P: FnMut(&ElementSnapshot) -> bool,
    {
        self.elements.iter().filter(|el| predicate(el)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_contains_is_case_insensitive() {
        let el = ElementSnapshot::new("input").with_attr("name", "bodyHeight");
        assert!(el.attr_contains("name", "height"));
        assert!(el.attr_contains("name", "HEIGHT"));
        assert!(!el.attr_contains("name", "weight"));
    }

    #[test]
    fn test_attr_contains_missing_attribute() {
        let el = ElementSnapshot::new("input");
        assert!(!el.attr_contains("placeholder", "height"));
    }

    #[test]
    fn test_tag_is_lowercased() {
        let el = ElementSnapshot::new("BUTTON");
        assert_eq!(el.tag, "button");
    }

    #[test]
    fn test_find_respects_document_order() {
        let mut dom = DomSnapshot::new();
        dom.push(ElementSnapshot::new("input").with_attr("id", "first"));
        dom.push(ElementSnapshot::new("input").with_attr("id", "second"));

        let found = dom.find(|el| el.tag == "input").unwrap();
        assert_eq!(found.attr("id"), Some("first"));
    }

    #[test]
    fn test_pointer_events() {
        let el = ElementSnapshot::new("button").with_pointer_events("none");
        assert!(!el.pointer_events_enabled());
        assert!(ElementSnapshot::new("button").pointer_events_enabled());
    }
}
