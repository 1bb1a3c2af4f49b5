//! Tag registry: the closed table of tags a tree may contain.
//!
//! Every non-void tag must be registered before it can be attached. A
//! registration carries the tag's allow-list of child tags; an empty list
//! means the tag accepts any registered child. Void tags are never looked up
//! here: they are always permitted and never take children.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Self-closing tags. Always permitted as children, never accept children.
pub const VOID_TAGS: &[&str] = &["img", "br", "hr", "input", "area", "link", "meta", "param"];

/// Check if a (lower-case) tag is a void tag.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Child tags allowed under a registered tag.
pub type AllowList = SmallVec<[String; 4]>;

/// Registration for a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    name: String,
    allowed: AllowList,
}

impl TagSpec {
    /// A tag that accepts any registered child.
    pub fn open(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            allowed: AllowList::new(),
        }
    }

    /// A tag that only accepts the listed children (plus void tags).
    pub fn restricted<I, S>(name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_ascii_lowercase(),
            allowed: allowed
                .into_iter()
                .map(|tag| tag.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// The tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The allow-list. Empty means unrestricted.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

/// Tags without a child restriction in the standard registry.
const OPEN_TAGS: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "blockquote", "body", "button",
    "canvas", "caption", "code", "dd", "details", "dialog", "div", "dl", "dt", "em", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "html", "i", "iframe", "label", "legend", "li", "main", "nav", "noscript", "option", "p",
    "pre", "s", "script", "section", "small", "span", "strong", "style", "sub", "summary", "sup",
    "td", "textarea", "th", "title", "u", "video",
];

/// Container tags with an allow-list in the standard registry.
const RESTRICTED_TAGS: &[(&str, &[&str])] = &[
    ("table", &["tbody", "tr"]),
    ("thead", &["tr"]),
    ("tbody", &["tr"]),
    ("tfoot", &["tr"]),
    ("tr", &["td", "th"]),
    ("ol", &["li"]),
    ("ul", &["li"]),
    ("select", &["option", "optgroup"]),
    ("optgroup", &["option"]),
];

static STANDARD: LazyLock<Arc<TagRegistry>> = LazyLock::new(|| Arc::new(TagRegistry::html()));

/// Registry of known tags.
///
/// # Examples
///
/// ```
/// use tagtree::{TagRegistry, TagSpec};
///
/// let mut registry = TagRegistry::new();
/// registry.register(TagSpec::restricted("menu", ["li"]));
/// registry.register(TagSpec::open("li"));
///
/// assert!(registry.has("menu"));
/// assert_eq!(registry.get("menu").unwrap().allowed(), ["li"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: HashMap<String, TagSpec>,
}

impl TagRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard HTML registry.
    pub fn html() -> Self {
        let mut registry = Self::new();
        for tag in OPEN_TAGS {
            registry.register(TagSpec::open(tag));
        }
        for (tag, allowed) in RESTRICTED_TAGS {
            registry.register(TagSpec::restricted(tag, allowed.iter()));
        }
        registry
    }

    /// Shared handle to the standard HTML registry.
    pub fn standard() -> Arc<TagRegistry> {
        Arc::clone(&STANDARD)
    }

    /// Register a tag.
    ///
    /// If a tag with the same name already exists, it will be replaced.
    pub fn register(&mut self, spec: TagSpec) {
        self.tags.insert(spec.name.clone(), spec);
    }

    /// Look up a tag by (lower-case) name.
    pub fn get(&self, tag: &str) -> Option<&TagSpec> {
        self.tags.get(tag)
    }

    /// Check if a tag is registered.
    pub fn has(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// List all registered tag names (sorted)
    pub fn list_tags(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
