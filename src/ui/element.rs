//! Lightweight DOM-like element tree.
//!
//! Controls mount into these trees and accessibility wiring manipulates
//! them. Every node carries a process-unique id so "same structure" and
//! "same node" stay distinguishable; cloning a subtree produces fresh ids,
//! matching DOM `cloneNode` semantics. Event listeners never live inside an
//! element (they belong to the control slot), so a clone never copies
//! behavior.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::prelude::HashMap;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
pub struct Element {
    node_id: u64,
    tag: String,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            node_id: fresh_node_id(),
            tag: tag.into(),
            classes: Vec::new(),
            attrs: HashMap::default(),
            text: None,
            children: Vec::new(),
        }
    }

    /// `div` with a space-separated class list, the common case.
    pub fn div(class_names: &str) -> Self {
        Self::new("div").with_classes(class_names)
    }

    pub fn with_classes(mut self, class_names: &str) -> Self {
        self.classes
            .extend(class_names.split_whitespace().map(str::to_string));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.iter().any(|c| c == class_name)
    }

    pub fn add_class(&mut self, class_name: &str) {
        if !self.has_class(class_name) {
            self.classes.push(class_name.to_string());
        }
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Depth-first search for the first descendant (or self) with the class.
    pub fn find_by_class(&self, class_name: &str) -> Option<&Element> {
        if self.has_class(class_name) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_by_class(class_name))
    }

    pub fn find_by_class_mut(&mut self, class_name: &str) -> Option<&mut Element> {
        if self.has_class(class_name) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_by_class_mut(class_name))
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_tag(tag))
    }

    /// Structural copy with fresh node ids throughout the subtree.
    pub fn deep_clone(&self) -> Element {
        Element {
            node_id: fresh_node_id(),
            tag: self.tag.clone(),
            classes: self.classes.clone(),
            attrs: self.attrs.clone(),
            text: self.text.clone(),
            children: self.children.iter().map(Element::deep_clone).collect(),
        }
    }
}

// Clone keeps DOM semantics: a copy is a new node, never an alias.
impl Clone for Element {
    fn clone(&self) -> Self {
        self.deep_clone()
    }
}

// Structural equality; node identity is compared via `node_id` explicitly.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.classes == other.classes
            && self.attrs == other.attrs
            && self.text == other.text
            && self.children == other.children
    }
}

impl Eq for Element {}

#[cfg(test)]
mod tests {
    use super::*;

    fn legend_fragment() -> Element {
        Element::div("legend-body")
            .with_child(Element::new("span").with_text("waterdiepte (m)"))
            .with_child(Element::new("img").with_classes("legend-swatch"))
    }

    #[test]
    fn test_deep_clone_is_structurally_equal_but_distinct() {
        let original = legend_fragment();
        let clone = original.deep_clone();

        assert_eq!(original, clone);
        assert_ne!(original.node_id(), clone.node_id());
        assert_ne!(
            original.children[0].node_id(),
            clone.children[0].node_id()
        );
    }

    #[test]
    fn test_mutating_clone_leaves_original_alone() {
        let original = legend_fragment();
        let mut clone = original.deep_clone();

        clone.children[0].set_text("gewijzigd");
        assert_eq!(original.children[0].text(), Some("waterdiepte (m)"));
        assert_ne!(original, clone);
    }

    #[test]
    fn test_find_by_class_descends() {
        let root = Element::div("outer").with_child(
            Element::div("middle").with_child(Element::new("a").with_classes("trigger")),
        );
        let found = root.find_by_class("trigger").unwrap();
        assert_eq!(found.tag(), "a");
        assert!(root.find_by_class("missing").is_none());
    }

    #[test]
    fn test_attrs() {
        let mut el = Element::new("a");
        assert!(el.attr("href").is_none());
        el.set_attr("href", "#");
        assert_eq!(el.attr("href"), Some("#"));
    }
}
