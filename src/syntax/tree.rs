//! Arena-indexed parse trees.
//!
//! Nodes live in a flat `Vec` per parse and reference their parent and
//! children by index, so trees are cycle-free and cheap to walk or diff.
//! A tree is a snapshot: it is discarded and rebuilt on reparse.

use serde::{Deserialize, Serialize};

use crate::text::selection::Selection;

/// Index of a node within its [`Tree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Node kind used for malformed input.
pub const ERROR_KIND: &str = "ERROR";

/// One syntax node: a kind, a document-absolute line/column range, and
/// arena links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: String,
    /// Covered range, in absolute document coordinates (sorted).
    pub range: Selection,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn is_error(&self) -> bool {
        self.kind == ERROR_KIND
    }

    /// True if the node spans more than one line.
    pub fn is_multiline(&self) -> bool {
        self.range.is_multiline()
    }

    pub fn start(&self) -> crate::text::Cursor {
        self.range.start
    }

    pub fn end(&self) -> crate::text::Cursor {
        self.range.end
    }
}

/// A parse tree for one language over one region of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree containing only a root node of `kind` covering `range`.
    pub fn new(kind: impl Into<String>, range: Selection) -> Self {
        Self {
            nodes: vec![Node {
                kind: kind.into(),
                range: range.sort(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child node under `parent`.
    pub fn push(
        &mut self,
        parent: NodeId,
        kind: impl Into<String>,
        range: Selection,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());

        self.nodes.push(Node {
            kind: kind.into(),
            range: range.sort(),
            parent: Some(parent),
            children: Vec::new(),
        });

        self.nodes[parent.0].children.push(id);

        id
    }

    /// Replace a node's range, e.g. when a block's closer is finally seen.
    pub fn set_range(&mut self, id: NodeId, range: Selection) {
        self.nodes[id.0].range = range.sort();
    }

    /// Replace a node's kind, e.g. to mark an unclosed block as `ERROR`.
    pub fn set_kind(&mut self, id: NodeId, kind: impl Into<String>) {
        self.nodes[id.0].kind = kind.into();
    }

    /// Pre-order walk of every node, root included.
    pub fn walk(&self) -> impl Iterator<Item = NodeId> + '_ {
        Walk {
            tree: self,
            stack: if self.nodes.is_empty() {
                vec![]
            } else {
                vec![NodeId(0)]
            },
        }
    }
}

struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);

        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }

        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::cursor::c;
    use crate::text::selection::s2;

    #[test]
    fn test_arena_links() {
        let mut tree = Tree::new("document", s2(c(0, 0), c(2, 0)));
        let root = tree.root();

        let a = tree.push(root, "statement", s2(c(0, 0), c(0, 5)));
        let b = tree.push(root, "block", s2(c(1, 0), c(2, 0)));
        let b1 = tree.push(b, "statement", s2(c(1, 1), c(1, 4)));

        assert_eq!(tree.node(a).parent, Some(root));
        assert_eq!(tree.node(b).children, vec![b1]);
        assert_eq!(tree.node(b1).parent, Some(b));
    }

    #[test]
    fn test_preorder_walk() {
        let mut tree = Tree::new("document", s2(c(0, 0), c(2, 0)));
        let root = tree.root();

        let a = tree.push(root, "a", s2(c(0, 0), c(0, 1)));
        let b = tree.push(root, "b", s2(c(1, 0), c(1, 1)));
        let a1 = tree.push(a, "a1", s2(c(0, 0), c(0, 1)));

        let order: Vec<NodeId> = tree.walk().collect();

        assert_eq!(order, vec![root, a, a1, b]);
    }

    #[test]
    fn test_error_kind() {
        let mut tree = Tree::new("document", s2(c(0, 0), c(1, 0)));
        let root = tree.root();
        let err = tree.push(root, ERROR_KIND, s2(c(0, 0), c(0, 3)));

        assert!(tree.node(err).is_error());
        assert!(!tree.node(root).is_error());
    }
}
