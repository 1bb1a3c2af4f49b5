//! Fluent tag tree builder with markup, array and JSON serialization.
//!
//! tagtree provides:
//! - **Tag registry**: a closed table of tags and the children each one accepts
//! - **Arena tree**: tags live in an `indextree` arena, linked by `NodeId`
//! - **Serialization**: indented markup, a nested positional array, or JSON,
//!   with wrapper tags optionally elided
//!
//! # Example
//!
//! ```rust
//! use tagtree::{RenderOptions, TagTree, attrs, render_from_array};
//!
//! let (mut tree, label) = TagTree::create("label")?;
//! tree.set_attribute(label, "title", "Click me")?;
//! tree.add_with(label, "input", attrs([("value", "test")]), "")?;
//!
//! let opts = RenderOptions::default();
//! let html = tree.html(label, &opts);
//! assert_eq!(html, "<label title=\"Click me\">\n  <input value=\"test\"/>\n</label>\n");
//!
//! // The array form renders back to the same markup
//! let records = tree.array(label, &opts);
//! assert_eq!(render_from_array(&records)?, html);
//!
//! // Tags outside a container's allow-list are rejected
//! let (mut tree, table) = TagTree::create("table")?;
//! assert!(tree.add(table, "td").is_err());
//! # Ok::<(), tagtree::TreeError>(())
//! ```

mod tracing_macros;

pub mod error;
pub mod node;
pub mod registry;
pub mod serialize;
pub mod tree;

pub use indextree::NodeId;

pub use error::TreeError;
pub use node::{AttrValue, Attributes, TagNode, attrs};
pub use registry::{TagRegistry, TagSpec, VOID_TAGS, is_void_tag};
pub use serialize::{
    Prepared, Record, RenderOptions, RequestContext, VoidRecord, prepare, render_array,
    render_from_array, render_from_array_with_limit, render_json, render_markup,
};
pub use tree::{DEFAULT_MAX_DEPTH, IntoClassNames, NodeMut, TagTree, TreeOptions};
