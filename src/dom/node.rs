//! Node types: NodeId, ElementData, Rect.

use indexmap::IndexMap;
use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Layout box of an element, in CSS pixels.
///
/// The runtime never computes layout; hosts (and tests) assign rects so that
/// pointer-driven widgets can map coordinates to values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Center point of the box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Data associated with a single element.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name (e.g. "div", "button").
    pub tag: String,
    /// Attributes in insertion order.
    pub attributes: IndexMap<String, String>,
    /// Inline style properties in insertion order.
    pub style: IndexMap<String, String>,
    /// Text content owned directly by this element.
    pub text: String,
    /// Layout box assigned by the host.
    pub rect: Rect,
}

impl ElementData {
    /// Create an element with the given tag and no attributes.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self {
            tag: tag.as_ref().to_ascii_lowercase(),
            attributes: IndexMap::new(),
            style: IndexMap::new(),
            text: String::new(),
            rect: Rect::default(),
        }
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text content (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Set an attribute. Returns `true` if the stored value changed.
    pub fn set_attr(&mut self, name: &str, value: &str) -> bool {
        match self.attributes.get_mut(name) {
            Some(existing) if existing == value => false,
            Some(existing) => {
                value.clone_into(existing);
                true
            }
            None => {
                self.attributes.insert(name.to_owned(), value.to_owned());
                true
            }
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        self.attributes.shift_remove(name).is_some()
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class. Returns `true` if it was absent.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        let next = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_owned(),
        };
        self.set_attr("class", &next)
    }

    /// Remove a class. Returns `true` if it was present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let next = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", &next)
    }

    /// Toggle a class: add if absent, remove if present.
    pub fn toggle_class(&mut self, class: &str) {
        if !self.remove_class(class) {
            self.add_class(class);
        }
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    /// Set an inline style property. Returns `true` if the value changed.
    pub fn set_style(&mut self, property: &str, value: &str) -> bool {
        match self.style.get_mut(property) {
            Some(existing) if existing == value => false,
            Some(existing) => {
                value.clone_into(existing);
                true
            }
            None => {
                self.style.insert(property.to_owned(), value.to_owned());
                true
            }
        }
    }

    /// Remove an inline style property. Returns `true` if it was present.
    pub fn remove_style(&mut self, property: &str) -> bool {
        self.style.shift_remove(property).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lowercases_tag() {
        let data = ElementData::new("BUTTON");
        assert_eq!(data.tag, "button");
        assert!(data.attributes.is_empty());
        assert!(data.text.is_empty());
    }

    #[test]
    fn builder_with_attr_and_text() {
        let data = ElementData::new("span").with_attr("id", "label").with_text("Hi");
        assert_eq!(data.id(), Some("label"));
        assert_eq!(data.text, "Hi");
    }

    #[test]
    fn set_attr_reports_change() {
        let mut data = ElementData::new("div");
        assert!(data.set_attr("role", "switch"));
        assert!(!data.set_attr("role", "switch"));
        assert!(data.set_attr("role", "button"));
        assert_eq!(data.attr("role"), Some("button"));
    }

    #[test]
    fn remove_attr_reports_presence() {
        let mut data = ElementData::new("div").with_attr("hidden", "");
        assert!(data.remove_attr("hidden"));
        assert!(!data.remove_attr("hidden"));
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let data = ElementData::new("div")
            .with_attr("b", "1")
            .with_attr("a", "2");
        let names: Vec<_> = data.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn class_helpers() {
        let mut data = ElementData::new("div").with_attr("class", "card  open");
        assert!(data.has_class("card"));
        assert!(data.has_class("open"));
        assert!(!data.add_class("card"));
        assert!(data.add_class("active"));
        assert_eq!(data.attr("class"), Some("card  open active"));
        assert!(data.remove_class("open"));
        assert_eq!(data.attr("class"), Some("card active"));
        data.toggle_class("card");
        assert!(!data.has_class("card"));
        data.toggle_class("card");
        assert!(data.has_class("card"));
    }

    #[test]
    fn style_set_and_remove() {
        let mut data = ElementData::new("div");
        assert!(data.set_style("overflow", "hidden"));
        assert!(!data.set_style("overflow", "hidden"));
        assert_eq!(data.style("overflow"), Some("hidden"));
        assert!(data.remove_style("overflow"));
        assert_eq!(data.style("overflow"), None);
    }

    #[test]
    fn rect_contains_and_center() {
        let rect = Rect::new(10.0, 0.0, 100.0, 20.0);
        assert!(rect.contains(10.0, 0.0));
        assert!(rect.contains(110.0, 20.0));
        assert!(!rect.contains(111.0, 5.0));
        assert_eq!(rect.center(), (60.0, 10.0));
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
    }
}
