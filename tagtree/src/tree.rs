//! Arena-backed tag tree and its fluent builder handle.
//!
//! All nodes live in one `indextree` arena. Parent and child links are
//! `NodeId`s into that arena, so a node never owns its parent and the tree
//! owns every node. The root is a synthetic container with an empty tag that
//! holds the top-level tags and is never emitted.

use indextree::{Arena, NodeId};
use std::fmt;
use std::sync::Arc;

use crate::debug;
use crate::error::TreeError;
use crate::node::{AttrValue, Attributes, TagNode, escape_attr};
use crate::registry::{AllowList, TagRegistry, is_void_tag};

/// Deepest nesting accepted by default, both when attaching and when rendering records.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options for building a tree.
#[derive(Clone, Debug)]
pub struct TreeOptions {
    /// Maximum nesting depth of tags (top-level tags are at depth 1).
    pub max_depth: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TreeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Class names accepted by [`TagTree::add_class`]: one string or a list of them.
///
/// Every entry is split on whitespace, so `"a b"` adds two classes.
pub trait IntoClassNames {
    /// Convert into raw (unsplit, untrimmed) entries.
    fn into_class_names(self) -> Vec<String>;
}

impl IntoClassNames for &str {
    fn into_class_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoClassNames for String {
    fn into_class_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoClassNames for &[&str] {
    fn into_class_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoClassNames for [&str; N] {
    fn into_class_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoClassNames for Vec<&str> {
    fn into_class_names(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoClassNames for Vec<String> {
    fn into_class_names(self) -> Vec<String> {
        self
    }
}

type ClassObserver = Box<dyn FnMut(&str)>;

/// A tree of tags.
///
/// ```
/// use tagtree::{RenderOptions, TagTree};
///
/// let (mut tree, table) = TagTree::create("table")?;
/// tree.node_mut(table).add("tr")?.add("td")?;
///
/// let html = tree.html(table, &RenderOptions::default());
/// assert_eq!(html, "<table>\n  <tr>\n    <td>\n    </td>\n  </tr>\n</table>\n");
/// # Ok::<(), tagtree::TreeError>(())
/// ```
pub struct TagTree {
    arena: Arena<TagNode>,
    root: NodeId,
    registry: Arc<TagRegistry>,
    options: TreeOptions,
    class_observer: Option<ClassObserver>,
}

impl fmt::Debug for TagTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagTree")
            .field("arena", &self.arena)
            .field("root", &self.root)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for TagTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TagTree {
    /// Create an empty tree backed by the standard HTML registry.
    pub fn new() -> Self {
        Self::with_registry(TagRegistry::standard())
    }

    /// Create an empty tree backed by a custom registry.
    pub fn with_registry(registry: Arc<TagRegistry>) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(TagNode::container());
        Self {
            arena,
            root,
            registry,
            options: TreeOptions::default(),
            class_observer: None,
        }
    }

    /// Replace the build options.
    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Create a tree holding a single top-level tag.
    pub fn create(tag: &str) -> Result<(Self, NodeId), TreeError> {
        Self::create_with(tag, Attributes::new(), "")
    }

    /// Create a tree holding a single top-level tag with attributes and text.
    pub fn create_with(
        tag: &str,
        attributes: Attributes,
        text: &str,
    ) -> Result<(Self, NodeId), TreeError> {
        let mut tree = Self::new();
        let root = tree.root;
        let id = tree.add_with(root, tag, attributes, text)?;
        Ok((tree, id))
    }

    /// The synthetic root container.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The registry this tree validates against.
    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Current build options.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Get node data, or `None` if `id` is not part of this tree.
    pub fn get(&self, id: NodeId) -> Option<&TagNode> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    /// Get node data, failing with [`TreeError::NodeNotFound`].
    pub fn node(&self, id: NodeId) -> Result<&TagNode, TreeError> {
        self.get(id).ok_or(TreeError::NodeNotFound)
    }

    fn node_data_mut(&mut self, id: NodeId) -> Result<&mut TagNode, TreeError> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
            .ok_or(TreeError::NodeNotFound)
    }

    /// Fluent handle for building below `id`.
    pub fn node_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut { tree: self, id }
    }

    /// Top-level tags, in order.
    pub fn top_level(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root.children(&self.arena)
    }

    /// Children of `id`, in order. Empty if `id` is not part of this tree.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .map(|_| id.children(&self.arena))
            .into_iter()
            .flatten()
    }

    /// Check if `id` has any children.
    pub fn has_children(&self, id: NodeId) -> bool {
        self.children(id).next().is_some()
    }

    /// Parent tag of `id`. `None` for top-level tags, the root, and unknown ids.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena
            .get(id)
            .and_then(|node| node.parent())
            .filter(|&parent| parent != self.root)
    }

    /// Nesting depth of `id`: 0 for the root (and unknown ids), 1 for top-level tags.
    pub fn depth(&self, id: NodeId) -> usize {
        if self.get(id).is_none() {
            return 0;
        }
        id.ancestors(&self.arena).count().saturating_sub(1)
    }

    /// Attach a new child tag under `parent`.
    pub fn add(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, TreeError> {
        self.add_with(parent, tag, Attributes::new(), "")
    }

    /// Attach a new child tag with attributes and text under `parent`.
    ///
    /// Fails without touching the tree if `parent` is void, does not permit
    /// `tag`, `tag` is not registered, or the new tag would be too deep.
    pub fn add_with(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: Attributes,
        text: &str,
    ) -> Result<NodeId, TreeError> {
        let tag = tag.to_ascii_lowercase();
        let parent_node = self.node(parent)?;

        if parent_node.is_void() {
            return Err(TreeError::VoidElement {
                tag: parent_node.tag.clone(),
            });
        }
        if !parent_node.permits(&tag) {
            return Err(TreeError::disallowed(&parent_node.tag, &tag));
        }

        let allowed: AllowList = if is_void_tag(&tag) {
            AllowList::new()
        } else {
            let spec = self
                .registry
                .get(&tag)
                .ok_or_else(|| TreeError::unknown_tag(&tag))?;
            spec.allowed().iter().cloned().collect()
        };

        let depth = self.depth(parent) + 1;
        if depth > self.options.max_depth {
            return Err(TreeError::TreeTooDeep {
                limit: self.options.max_depth,
            });
        }

        let mut node = TagNode::new(&tag, allowed);
        node.attributes = escape_all(attributes);
        node.set_text(text);

        let id = self.arena.new_node(node);
        parent.append(id, &mut self.arena);
        debug!("attached <{}> at depth {}", tag, depth);
        Ok(id)
    }

    /// Rename the tag of `id`.
    ///
    /// Rejected when either name is a void tag, when the parent has an
    /// allow-list that does not contain `new_tag`, or when `new_tag` has an
    /// allow-list that an existing non-void child is missing from. An
    /// unrestricted parent accepts any registered name. The node takes the
    /// allow-list of its new tag and keeps its children.
    pub fn rename(&mut self, id: NodeId, new_tag: &str) -> Result<(), TreeError> {
        let new_tag = new_tag.to_ascii_lowercase();
        let node = self.node(id)?;

        if node.is_container() || node.is_void() || is_void_tag(&new_tag) {
            return Err(TreeError::rename(&node.tag, &new_tag));
        }

        let parent = self.arena[id].parent().and_then(|parent| self.get(parent));
        if let Some(parent) = parent
            && !parent.allowed.is_empty()
            && !parent.allowed.iter().any(|tag| *tag == new_tag)
        {
            return Err(TreeError::rename(&node.tag, &new_tag));
        }

        let allowed: AllowList = self
            .registry
            .get(&new_tag)
            .ok_or_else(|| TreeError::unknown_tag(&new_tag))?
            .allowed()
            .iter()
            .cloned()
            .collect();

        if !allowed.is_empty() {
            let stranded = self
                .children(id)
                .filter_map(|child| self.get(child))
                .any(|child| !child.is_void() && !allowed.iter().any(|tag| *tag == child.tag));
            if stranded {
                return Err(TreeError::rename(&node.tag, &new_tag));
            }
        }

        let node = self.node_data_mut(id)?;
        debug!("renamed <{}> to <{}>", node.tag, new_tag);
        node.tag = new_tag;
        node.allowed = allowed;
        Ok(())
    }

    /// Set text content. Empty text is ignored and keeps the previous value.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        self.node_data_mut(id)?.set_text(text);
        Ok(())
    }

    /// Text content of `id`.
    pub fn text(&self, id: NodeId) -> Result<&str, TreeError> {
        Ok(self.node(id)?.text())
    }

    /// Set (or replace) a single attribute.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), TreeError> {
        let value = escape_attr(name, value.into());
        self.node_data_mut(id)?
            .attributes
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Look up a single attribute.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.get(id).and_then(|node| node.attribute(name))
    }

    /// Replace all attributes of `id`.
    pub fn set_attributes(&mut self, id: NodeId, attributes: Attributes) -> Result<(), TreeError> {
        self.node_data_mut(id)?.attributes = escape_all(attributes);
        Ok(())
    }

    /// All attributes of `id`, in insertion order.
    pub fn attributes(&self, id: NodeId) -> Result<&Attributes, TreeError> {
        Ok(self.node(id)?.attributes())
    }

    /// Toggle newlines and indentation around `id` in markup output.
    pub fn set_whitespace(&mut self, id: NodeId, whitespace: bool) -> Result<(), TreeError> {
        self.node_data_mut(id)?.whitespace = whitespace;
        Ok(())
    }

    /// Install a callback invoked once for every class name added by
    /// [`TagTree::add_class`].
    pub fn set_class_observer(&mut self, observer: impl FnMut(&str) + 'static) {
        self.class_observer = Some(Box::new(observer));
    }

    /// Append class names to the `class` attribute.
    ///
    /// Entries are split on whitespace; empty names are dropped and duplicates
    /// are kept.
    pub fn add_class(&mut self, id: NodeId, classes: impl IntoClassNames) -> Result<(), TreeError> {
        let entries = classes.into_class_names();
        let names: Vec<&str> = entries
            .iter()
            .flat_map(|entry| entry.split_whitespace())
            .collect();
        if names.is_empty() {
            self.node(id)?;
            return Ok(());
        }

        let node = self
            .arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .ok_or(TreeError::NodeNotFound)?
            .get_mut();

        let observer = &mut self.class_observer;
        edit_class_list(&mut node.attributes, |list| {
            for name in names {
                if let Some(observer) = observer.as_mut() {
                    observer(name);
                }
                list.push(name.to_string());
            }
        });
        Ok(())
    }

    /// Remove the first occurrence of a class name. Returns whether one was removed.
    pub fn remove_class(&mut self, id: NodeId, name: &str) -> Result<bool, TreeError> {
        let node = self.node_data_mut(id)?;
        if !node.attributes.contains_key("class") {
            return Ok(false);
        }
        let removed = edit_class_list(&mut node.attributes, |list| {
            match list.iter().position(|class| class == name) {
                Some(pos) => {
                    list.remove(pos);
                    true
                }
                None => false,
            }
        });
        Ok(removed)
    }
}

fn escape_all(attributes: Attributes) -> Attributes {
    attributes
        .into_iter()
        .map(|(name, value)| {
            let value = escape_attr(&name, value);
            (name, value)
        })
        .collect()
}

/// Edit the `class` attribute as a list. A plain string value is split on
/// whitespace first, and the attribute is stored back as a list.
fn edit_class_list<R>(
    attributes: &mut Attributes,
    edit: impl FnOnce(&mut Vec<String>) -> R,
) -> R {
    let entry = attributes
        .entry("class".to_string())
        .or_insert_with(|| AttrValue::List(Vec::new()));
    let mut list = match std::mem::replace(entry, AttrValue::List(Vec::new())) {
        AttrValue::List(list) => list,
        AttrValue::Text(text) => text.split_whitespace().map(str::to_string).collect(),
    };
    let result = edit(&mut list);
    *entry = AttrValue::List(list);
    result
}

/// Fluent handle on one node of a [`TagTree`].
///
/// Building methods consume the handle and return a handle to the node they
/// produce, so calls chain downwards:
///
/// ```
/// use tagtree::TagTree;
///
/// let mut tree = TagTree::new();
/// let root = tree.root();
/// tree.node_mut(root).add("select")?.add("optgroup")?.add("option")?;
/// assert!(tree.node_mut(root).add("tr").is_ok());
/// # Ok::<(), tagtree::TreeError>(())
/// ```
pub struct NodeMut<'a> {
    tree: &'a mut TagTree,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    /// The node this handle points at.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node data.
    pub fn get(&self) -> Result<&TagNode, TreeError> {
        self.tree.node(self.id)
    }

    /// Attach a child and move to it.
    pub fn add(self, tag: &str) -> Result<NodeMut<'a>, TreeError> {
        let id = self.tree.add(self.id, tag)?;
        Ok(NodeMut {
            tree: self.tree,
            id,
        })
    }

    /// Attach a child with attributes and text and move to it.
    pub fn add_with(
        self,
        tag: &str,
        attributes: Attributes,
        text: &str,
    ) -> Result<NodeMut<'a>, TreeError> {
        let id = self.tree.add_with(self.id, tag, attributes, text)?;
        Ok(NodeMut {
            tree: self.tree,
            id,
        })
    }

    /// Move to the parent tag, if any.
    pub fn parent(self) -> Option<NodeMut<'a>> {
        let id = self.tree.parent(self.id)?;
        Some(NodeMut {
            tree: self.tree,
            id,
        })
    }

    /// Set text content (ignored when empty).
    pub fn text(self, text: &str) -> Result<Self, TreeError> {
        self.tree.set_text(self.id, text)?;
        Ok(self)
    }

    /// Set a single attribute.
    pub fn attr(self, name: &str, value: impl Into<AttrValue>) -> Result<Self, TreeError> {
        self.tree.set_attribute(self.id, name, value)?;
        Ok(self)
    }

    /// Replace all attributes.
    pub fn attrs(self, attributes: Attributes) -> Result<Self, TreeError> {
        self.tree.set_attributes(self.id, attributes)?;
        Ok(self)
    }

    /// Append class names.
    pub fn class(self, classes: impl IntoClassNames) -> Result<Self, TreeError> {
        self.tree.add_class(self.id, classes)?;
        Ok(self)
    }

    /// Rename this tag.
    pub fn rename(self, tag: &str) -> Result<Self, TreeError> {
        self.tree.rename(self.id, tag)?;
        Ok(self)
    }

    /// Toggle whitespace around this tag in markup output.
    pub fn whitespace(self, whitespace: bool) -> Result<Self, TreeError> {
        self.tree.set_whitespace(self.id, whitespace)?;
        Ok(self)
    }
}
