//! Errors raised while building or rendering a tag tree.

use facet::Facet;

/// Errors that can occur while building a tree or rendering records.
///
/// None of these are retried: the offending call fails and the tree is left
/// exactly as it was before the call.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum TreeError {
    /// unknown tag <{tag}>
    UnknownTag { tag: String },

    /// <{parent}> does not permit <{child}>
    DisallowedChild { parent: String, child: String },

    /// cannot rename <{from}> to <{to}>
    TagRename { from: String, to: String },

    /// <{tag}> is a void element and cannot have children
    VoidElement { tag: String },

    /// tree is deeper than the limit of {limit}
    TreeTooDeep { limit: usize },

    /// not a valid node id for this tree's arena
    NodeNotFound,

    /// json serialization failed: {message}
    Json { message: String },
}

impl TreeError {
    pub(crate) fn unknown_tag(tag: &str) -> Self {
        TreeError::UnknownTag {
            tag: tag.to_string(),
        }
    }

    pub(crate) fn disallowed(parent: &str, child: &str) -> Self {
        TreeError::DisallowedChild {
            parent: parent.to_string(),
            child: child.to_string(),
        }
    }

    pub(crate) fn rename(from: &str, to: &str) -> Self {
        TreeError::TagRename {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
