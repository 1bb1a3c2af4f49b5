//! Node data stored in the tree arena.

use indexmap::IndexMap;
use std::fmt;

use crate::registry::{AllowList, is_void_tag};

/// Attribute value: a plain string or a list (e.g. class names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Single value, written as-is.
    Text(String),
    /// List of values, space-joined when written.
    List(Vec<String>),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => f.write_str(text),
            AttrValue::List(items) => f.write_str(&items.join(" ")),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::List(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        AttrValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Insertion-ordered attribute map.
pub type Attributes = IndexMap<String, AttrValue>;

/// Build an [`Attributes`] map from name/value pairs.
///
/// ```
/// use tagtree::{AttrValue, attrs};
///
/// let map = attrs([("title", "Click me"), ("id", "go")]);
/// assert_eq!(map.get("title"), Some(&AttrValue::from("Click me")));
/// ```
pub fn attrs<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttrValue>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// Apply the one escaping rule: `value` attributes are HTML-escaped when set on a node.
pub(crate) fn escape_attr(name: &str, value: AttrValue) -> AttrValue {
    if name != "value" {
        return value;
    }
    match value {
        AttrValue::Text(text) => AttrValue::Text(escape_html(&text)),
        AttrValue::List(items) => AttrValue::List(items.iter().map(|s| escape_html(s)).collect()),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// A single tag in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    pub(crate) tag: String,
    pub(crate) text: String,
    pub(crate) attributes: Attributes,
    pub(crate) allowed: AllowList,
    pub(crate) whitespace: bool,
}

impl TagNode {
    pub(crate) fn new(tag: &str, allowed: AllowList) -> Self {
        Self {
            tag: tag.to_string(),
            text: String::new(),
            attributes: Attributes::new(),
            allowed,
            whitespace: true,
        }
    }

    /// The synthetic container holding top-level tags. Its tag is empty and never emitted.
    pub(crate) fn container() -> Self {
        Self::new("", AllowList::new())
    }

    /// Lower-case tag name. Empty for the root container.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Text content, empty if none.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Child tags this node accepts. Empty means unrestricted.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Whether newlines and indentation are written around this node.
    pub fn whitespace(&self) -> bool {
        self.whitespace
    }

    /// Whether this is a self-closing tag.
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    pub(crate) fn is_container(&self) -> bool {
        self.tag.is_empty()
    }

    /// Check if `child` may be attached under this node.
    pub(crate) fn permits(&self, child: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|tag| tag == child) || is_void_tag(child)
    }

    /// Set text, ignoring empty values.
    pub(crate) fn set_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.text = text.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_value_attribute_is_escaped() {
        assert_eq!(
            escape_attr("value", AttrValue::from("a < b & \"c\"")),
            AttrValue::from("a &lt; b &amp; &quot;c&quot;")
        );
        assert_eq!(
            escape_attr("title", AttrValue::from("a < b")),
            AttrValue::from("a < b")
        );
    }

    #[test]
    fn test_list_display_joins_with_space() {
        let value = AttrValue::from(vec!["a", "b", "c"]);
        assert_eq!(value.to_string(), "a b c");
    }

    #[test]
    fn test_empty_text_keeps_previous() {
        let mut node = TagNode::new("p", AllowList::new());
        node.set_text("hello");
        node.set_text("");
        assert_eq!(node.text(), "hello");
    }

    #[test]
    fn test_permits() {
        let node = TagNode::new("table", ["tr".to_string()].into_iter().collect());
        assert!(node.permits("tr"));
        assert!(node.permits("br"));
        assert!(!node.permits("td"));
        assert!(TagNode::container().permits("td"));
    }
}
