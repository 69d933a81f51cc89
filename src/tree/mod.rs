//! Path-addressable tree over disassembled containers.
//!
//! Every entity of a disassembly (the forest root, containers, classes, methods and fields)
//! owns one [`Node`]: its key plus a weak back-reference to the node of its parent. Entities
//! own their children, so ownership runs strictly top-down and the tree can be dropped
//! without cycles, while any entity can still report its full path:
//!
//! ```text
//! <root>/classes.dex/Lcom/example/Main;/onCreate
//! ```
//!
//! Keys are only unique among siblings; uniqueness is not checked.
//!
//! # Key Components
//!
//! - [`TreeNode`] - Key, parent and derived path of any entity
//! - [`Node`] / [`NodeRef`] - Tree link and its weak back-reference
//! - [`DexTree`], [`DexContainer`], [`DexClass`], [`DexMethod`], [`DexField`] - Entities
//!
//! # Example
//!
//! ```rust
//! use dextree::tree::{Node, TreeNode, ROOT_KEY};
//!
//! let root = Node::root(ROOT_KEY);
//! let file = Node::child(&root, "classes.dex");
//! let class = Node::child(&file, "LMain;");
//!
//! assert_eq!(class.path(), "<root>/classes.dex/LMain;");
//! assert_eq!(class.depth(), 2);
//! ```

mod entities;

use std::sync::{Arc, Weak};

pub use entities::{DexClass, DexContainer, DexField, DexMethod, DexTree};

/// Key of the synthetic forest root.
pub const ROOT_KEY: &str = "<root>";

/// Separator between the keys of a path.
pub const PATH_SEPARATOR: char = '/';

/// Shared pointer to a [`Node`]
pub type NodeRc = Arc<Node>;

/// Key and parent of an entity in the tree.
///
/// `path()` and `depth()` are derived from the parent chain on every call and never cached.
pub trait TreeNode {
    /// Returns the key of this entity, unique among its siblings.
    fn key(&self) -> &str;

    /// Returns the parent node, or `None` for the root (or if the parent has been dropped).
    fn parent(&self) -> Option<NodeRc>;

    /// Returns the keys from the root down to this entity, joined with `/`.
    fn path(&self) -> String {
        let mut segments = vec![self.key().to_string()];

        let mut current = self.parent();
        while let Some(node) = current {
            segments.push(node.key().to_string());
            current = node.parent();
        }

        segments.reverse();
        segments.join(&PATH_SEPARATOR.to_string())
    }

    /// Returns the number of ancestors of this entity.
    fn depth(&self) -> usize {
        let mut depth = 0;

        let mut current = self.parent();
        while let Some(node) = current {
            depth += 1;
            current = node.parent();
        }

        depth
    }
}

/// A weak reference to the [`Node`] of a parent entity.
///
/// Children hold this instead of an [`Arc`] so that no entity keeps its parent alive.
#[derive(Clone, Debug)]
pub struct NodeRef {
    weak_ref: Weak<Node>,
}

impl NodeRef {
    /// Create a new `NodeRef` from a strong reference
    #[must_use]
    pub fn new(strong_ref: &NodeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the node, returning `None` if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<NodeRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced node is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }
}

impl From<&NodeRc> for NodeRef {
    fn from(strong_ref: &NodeRc) -> Self {
        Self::new(strong_ref)
    }
}

/// The tree link of one entity.
#[derive(Debug)]
pub struct Node {
    key: String,
    parent: Option<NodeRef>,
}

impl Node {
    /// Creates a parentless node.
    #[must_use]
    pub fn root(key: impl Into<String>) -> NodeRc {
        Arc::new(Node {
            key: key.into(),
            parent: None,
        })
    }

    /// Creates a node below `parent`.
    ///
    /// A parent must exist before its children, which keeps every parent chain finite and
    /// acyclic.
    #[must_use]
    pub fn child(parent: &NodeRc, key: impl Into<String>) -> NodeRc {
        Arc::new(Node {
            key: key.into(),
            parent: Some(NodeRef::new(parent)),
        })
    }
}

impl TreeNode for Node {
    fn key(&self) -> &str {
        &self.key
    }

    fn parent(&self) -> Option<NodeRc> {
        self.parent.as_ref().and_then(NodeRef::upgrade)
    }
}
