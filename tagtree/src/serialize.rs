//! Serializers for tag trees.
//!
//! A tree can be written out three ways:
//!
//! - **Markup**: indented text, two spaces per level, one tag per line
//! - **Records**: a nested positional array, `[tag, attributes, text, children]`
//!   per tag and `[markup]` per void tag
//! - **JSON**: the records encoded as JSON arrays
//!
//! All three honour [`RenderOptions::ignore_tags`]: an ignored tag writes
//! nothing of its own and its children take its place one level up. The root
//! container is always ignored.

use facet::Facet;
use indextree::NodeId;
use std::fmt::Write;

use crate::error::TreeError;
use crate::node::{Attributes, TagNode};
use crate::tree::{DEFAULT_MAX_DEPTH, TagTree};
use crate::trace;

/// Options for serialization.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Tags whose own markup is suppressed while their children are still written.
    pub ignore_tags: Vec<String>,
}

impl RenderOptions {
    /// Create new default options (nothing ignored).
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore one more tag.
    pub fn ignore(mut self, tag: &str) -> Self {
        self.ignore_tags.push(tag.to_ascii_lowercase());
        self
    }

    /// Ignore several more tags.
    pub fn ignore_all<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore_tags
            .extend(tags.into_iter().map(|tag| tag.as_ref().to_ascii_lowercase()));
        self
    }

    /// Check if a tag is ignored.
    pub fn ignores(&self, tag: &str) -> bool {
        self.ignore_tags.iter().any(|ignored| ignored == tag)
    }

    fn skips(&self, node: &TagNode) -> bool {
        node.is_container() || self.ignores(node.tag())
    }
}

/// One entry of the positional array form.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(untagged)]
#[repr(u8)]
pub enum Record {
    /// `[tag, attributes, text, children]`, where `attributes` is the
    /// rendered attribute string (`' name="value"'` per attribute).
    Element(
        String,
        String,
        String,
        #[facet(recursive_type)] Vec<Record>,
    ),
    /// `[markup]`: the complete self-closing markup of a void tag.
    Void(VoidRecord),
}

/// Self-closing markup of a void tag, encoded as a one-element array.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct VoidRecord(pub String);

impl Record {
    /// Build an element record.
    pub fn element(
        tag: impl Into<String>,
        attributes: impl Into<String>,
        text: impl Into<String>,
        children: Vec<Record>,
    ) -> Self {
        Record::Element(tag.into(), attributes.into(), text.into(), children)
    }

    /// Build a void record from its complete markup.
    pub fn void(markup: impl Into<String>) -> Self {
        Record::Void(VoidRecord(markup.into()))
    }
}

/// Output picked by [`prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    /// Markup text, for regular requests.
    Html(String),
    /// Records, for background (async) requests.
    Array(Vec<Record>),
}

/// Request context consulted by [`prepare`].
pub trait RequestContext {
    /// Whether the current request is an asynchronous/background one.
    fn is_async(&self) -> bool;
}

impl RequestContext for bool {
    fn is_async(&self) -> bool {
        *self
    }
}

/// Render the attribute string: ` name="value"` per attribute, lists space-joined.
///
/// Values are written as stored; escaping happens when they are set.
pub fn attribute_string(attributes: &Attributes) -> String {
    let mut out = String::new();
    for (name, value) in attributes {
        let _ = write!(out, " {}=\"{}\"", name, value);
    }
    out
}

/// Self-closing markup for a void tag.
fn void_markup(node: &TagNode) -> String {
    format!("<{}{}/>", node.tag(), attribute_string(node.attributes()))
}

/// Render `id` and its descendants as indented markup.
pub fn render_markup(tree: &TagTree, id: NodeId, options: &RenderOptions) -> String {
    let mut out = String::new();
    let mut ser = Serializer::new(&mut out, options);
    ser.write_node(tree, id);
    out
}

/// Render `id` and its descendants as records.
///
/// The result is a list because ignored tags (and the root container) splice
/// their children into it.
pub fn render_array(tree: &TagTree, id: NodeId, options: &RenderOptions) -> Vec<Record> {
    let mut records = Vec::new();
    collect_records(tree, id, options, &mut records);
    records
}

/// Render `id` and its descendants as JSON-encoded records.
pub fn render_json(
    tree: &TagTree,
    id: NodeId,
    options: &RenderOptions,
) -> Result<String, TreeError> {
    let records = render_array(tree, id, options);
    facet_json::to_string(&records).map_err(|err| TreeError::Json {
        message: format!("{err:?}"),
    })
}

/// Rebuild markup from records produced by [`render_array`].
///
/// Void records are written verbatim. Element records with an empty tag are
/// transparent: their children are written in their place.
pub fn render_from_array(records: &[Record]) -> Result<String, TreeError> {
    render_from_array_with_limit(records, DEFAULT_MAX_DEPTH)
}

/// Like [`render_from_array`], with an explicit nesting limit.
pub fn render_from_array_with_limit(
    records: &[Record],
    max_depth: usize,
) -> Result<String, TreeError> {
    let options = RenderOptions::default();
    let mut out = String::new();
    let mut ser = Serializer::new(&mut out, &options);
    for record in records {
        ser.write_record(record, max_depth)?;
    }
    Ok(out)
}

/// Markup for regular requests, records for async ones.
pub fn prepare(
    tree: &TagTree,
    id: NodeId,
    context: &impl RequestContext,
    options: &RenderOptions,
) -> Prepared {
    if context.is_async() {
        Prepared::Array(render_array(tree, id, options))
    } else {
        Prepared::Html(render_markup(tree, id, options))
    }
}

fn collect_records(tree: &TagTree, id: NodeId, options: &RenderOptions, out: &mut Vec<Record>) {
    let Some(node) = tree.get(id) else {
        return;
    };

    if options.skips(node) {
        for child in tree.children(id) {
            collect_records(tree, child, options, out);
        }
        return;
    }

    if node.is_void() {
        out.push(Record::void(void_markup(node)));
        return;
    }

    let mut children = Vec::new();
    for child in tree.children(id) {
        collect_records(tree, child, options, &mut children);
    }
    out.push(Record::element(
        node.tag(),
        attribute_string(node.attributes()),
        node.text(),
        children,
    ));
}

struct Serializer<'a, W: Write> {
    out: &'a mut W,
    options: &'a RenderOptions,
    depth: usize,
}

impl<'a, W: Write> Serializer<'a, W> {
    fn new(out: &'a mut W, options: &'a RenderOptions) -> Self {
        Self {
            out,
            options,
            depth: 0,
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth {
            let _ = write!(self.out, "  ");
        }
    }

    fn write_node(&mut self, tree: &TagTree, id: NodeId) {
        let Some(node) = tree.get(id) else {
            return;
        };
        let skipped = self.options.skips(node);
        let whitespace = node.whitespace();
        trace!(tag = node.tag(), depth = self.depth, skipped, "write node");

        if node.is_void() {
            if !skipped {
                self.write_indent();
                let _ = writeln!(self.out, "{}", void_markup(node));
            }
            return;
        }

        if !skipped {
            self.write_indent();
            let _ = write!(
                self.out,
                "<{}{}>",
                node.tag(),
                attribute_string(node.attributes())
            );
            if whitespace {
                let _ = writeln!(self.out);
            }
            if !node.text().is_empty() {
                if whitespace {
                    self.write_indent();
                    let _ = write!(self.out, "  ");
                }
                let _ = write!(self.out, "{}", node.text());
                if whitespace {
                    let _ = writeln!(self.out);
                }
            }
            self.depth += 1;
        }

        for child in tree.children(id) {
            self.write_node(tree, child);
        }

        if !skipped {
            self.depth -= 1;
            if whitespace {
                self.write_indent();
            }
            let _ = writeln!(self.out, "</{}>", node.tag());
        }
    }

    fn write_record(&mut self, record: &Record, max_depth: usize) -> Result<(), TreeError> {
        if self.depth >= max_depth {
            return Err(TreeError::TreeTooDeep { limit: max_depth });
        }

        match record {
            Record::Void(VoidRecord(markup)) => {
                self.write_indent();
                let _ = writeln!(self.out, "{}", markup);
            }
            Record::Element(tag, _, _, children) if tag.is_empty() => {
                for child in children {
                    self.write_record(child, max_depth)?;
                }
            }
            Record::Element(tag, attributes, text, children) => {
                self.write_indent();
                let _ = writeln!(self.out, "<{}{}>", tag, attributes);
                if !text.is_empty() {
                    self.write_indent();
                    let _ = writeln!(self.out, "  {}", text);
                }
                self.depth += 1;
                for child in children {
                    self.write_record(child, max_depth)?;
                }
                self.depth -= 1;
                self.write_indent();
                let _ = writeln!(self.out, "</{}>", tag);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Convenience methods on TagTree
// =============================================================================

impl TagTree {
    /// Markup for `id` and its descendants.
    pub fn html(&self, id: NodeId, options: &RenderOptions) -> String {
        render_markup(self, id, options)
    }

    /// Markup for the whole tree.
    pub fn to_html(&self) -> String {
        render_markup(self, self.root(), &RenderOptions::default())
    }

    /// Records for `id` and its descendants.
    pub fn array(&self, id: NodeId, options: &RenderOptions) -> Vec<Record> {
        render_array(self, id, options)
    }

    /// JSON-encoded records for `id` and its descendants.
    pub fn json(&self, id: NodeId, options: &RenderOptions) -> Result<String, TreeError> {
        render_json(self, id, options)
    }

    /// Markup or records for `id`, depending on the request context.
    pub fn prepare(
        &self,
        id: NodeId,
        context: &impl RequestContext,
        options: &RenderOptions,
    ) -> Prepared {
        prepare(self, id, context, options)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::attrs;
    use facet_testhelpers::test;

    #[test]
    fn test_void_tag_markup() {
        let (tree, input) = TagTree::create("input").unwrap();
        assert_eq!(tree.html(input, &RenderOptions::default()), "<input/>\n");

        let (tree, input) =
            TagTree::create_with("input", attrs([("value", "test")]), "test").unwrap();
        assert_eq!(
            tree.html(input, &RenderOptions::default()),
            "<input value=\"test\"/>\n"
        );
    }

    #[test]
    fn test_label_with_input() {
        let (mut tree, label) = TagTree::create("label").unwrap();
        tree.add_with(label, "input", attrs([("value", "test")]), "")
            .unwrap();
        assert_eq!(
            tree.html(label, &RenderOptions::default()),
            "<label>\n  <input value=\"test\"/>\n</label>\n"
        );
    }

    #[test]
    fn test_text_is_indented() {
        let (mut tree, ul) = TagTree::create("ul").unwrap();
        tree.add_with(ul, "li", Attributes::new(), "one").unwrap();
        assert_eq!(tree.to_html(), "<ul>\n  <li>\n    one\n  </li>\n</ul>\n");
    }

    #[test]
    fn test_without_whitespace() {
        let (mut tree, p) = TagTree::create_with("p", Attributes::new(), "hi").unwrap();
        tree.set_whitespace(p, false).unwrap();
        assert_eq!(tree.to_html(), "<p>hi</p>\n");
    }

    #[test]
    fn test_without_whitespace_around_children() {
        let (mut tree, div) = TagTree::create("div").unwrap();
        tree.node_mut(div)
            .whitespace(false)
            .unwrap()
            .text("hi")
            .unwrap()
            .add("span")
            .unwrap();
        assert_eq!(tree.to_html(), "<div>hi  <span>\n  </span>\n</div>\n");
    }

    #[test]
    fn test_ignored_void_tag_is_dropped() {
        let (mut tree, div) = TagTree::create("div").unwrap();
        tree.add(div, "br").unwrap();
        tree.add(div, "p").unwrap();

        let opts = RenderOptions::default().ignore("br");
        assert_eq!(tree.html(div, &opts), "<div>\n  <p>\n  </p>\n</div>\n");
        assert_eq!(
            tree.array(div, &opts),
            vec![Record::element(
                "div",
                "",
                "",
                vec![Record::element("p", "", "", vec![])]
            )]
        );
    }

    #[test]
    fn test_json_nested_records() {
        let (mut tree, table) = TagTree::create("table").unwrap();
        let tr = tree.add(table, "tr").unwrap();
        tree.add_with(tr, "td", Attributes::new(), "a").unwrap();
        tree.add(tr, "br").unwrap();

        assert_eq!(
            tree.json(table, &RenderOptions::default()).unwrap(),
            r#"[["table","","",[["tr","","",[["td","","a",[]],["<br/>"]]]]]]"#
        );
    }

    #[test]
    fn test_ignore_tags() {
        let (mut tree, table) = TagTree::create("table").unwrap();
        tree.node_mut(table).add("tr").unwrap().add("td").unwrap();

        let opts = RenderOptions::default().ignore("table");
        assert_eq!(tree.html(table, &opts), "<tr>\n  <td>\n  </td>\n</tr>\n");
    }

    #[test]
    fn test_ignore_chain_flattens_records() {
        let (mut tree, table) = TagTree::create("table").unwrap();
        let tbody = tree.add(table, "tbody").unwrap();
        let tr = tree.add(tbody, "tr").unwrap();
        tree.add(tr, "td").unwrap();
        tree.add(tr, "td").unwrap();

        let opts = RenderOptions::default().ignore_all(["TABLE", "tbody", "tr"]);
        assert_eq!(
            tree.array(table, &opts),
            vec![
                Record::element("td", "", "", vec![]),
                Record::element("td", "", "", vec![]),
            ]
        );
        assert_eq!(tree.html(table, &opts), "<td>\n</td>\n<td>\n</td>\n");
    }

    #[test]
    fn test_array_shape() {
        let (mut tree, label) =
            TagTree::create_with("label", attrs([("title", "Click me")]), "Name").unwrap();
        tree.add_with(label, "input", attrs([("value", "test")]), "")
            .unwrap();

        assert_eq!(
            tree.array(label, &RenderOptions::default()),
            vec![Record::element(
                "label",
                " title=\"Click me\"",
                "Name",
                vec![Record::void("<input value=\"test\"/>")],
            )]
        );
    }

    #[test]
    fn test_class_list_joined() {
        let (mut tree, div) = TagTree::create("div").unwrap();
        tree.add_class(div, ["a b", "c"]).unwrap();
        assert_eq!(tree.to_html(), "<div class=\"a b c\">\n</div>\n");
    }

    #[test]
    fn test_from_array_round_trip() {
        let (mut tree, form) = TagTree::create_with("form", attrs([("id", "f")]), "").unwrap();
        let select = tree.add(form, "select").unwrap();
        let group = tree
            .add_with(select, "optgroup", attrs([("label", "A")]), "")
            .unwrap();
        tree.add_with(group, "option", Attributes::new(), "one")
            .unwrap();
        tree.add(form, "br").unwrap();
        tree.add_with(form, "p", Attributes::new(), "done").unwrap();

        let opts = RenderOptions::default();
        let records = tree.array(form, &opts);
        assert_eq!(render_from_array(&records).unwrap(), tree.html(form, &opts));

        let opts = RenderOptions::default().ignore("select");
        let records = tree.array(form, &opts);
        assert_eq!(render_from_array(&records).unwrap(), tree.html(form, &opts));
    }

    #[test]
    fn test_from_array_empty_tag_is_transparent() {
        let records = vec![Record::element(
            "",
            "",
            "",
            vec![Record::element("p", "", "", vec![])],
        )];
        assert_eq!(render_from_array(&records).unwrap(), "<p>\n</p>\n");
    }

    #[test]
    fn test_from_array_depth_limit() {
        let mut record = Record::element("div", "", "", vec![]);
        for _ in 0..4 {
            record = Record::element("div", "", "", vec![record]);
        }
        assert!(render_from_array_with_limit(std::slice::from_ref(&record), 5).is_ok());
        assert_eq!(
            render_from_array_with_limit(&[record], 4).unwrap_err(),
            TreeError::TreeTooDeep { limit: 4 }
        );
    }

    #[test]
    fn test_prepare() {
        let (tree, label) = TagTree::create("label").unwrap();
        let opts = RenderOptions::default();

        assert_eq!(
            tree.prepare(label, &false, &opts),
            Prepared::Html("<label>\n</label>\n".to_string())
        );
        assert_eq!(
            tree.prepare(label, &true, &opts),
            Prepared::Array(vec![Record::element("label", "", "", vec![])])
        );
    }
}
