//! Read-side tree view of a [`Graph`](crate::Graph).

use lwwes_types::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::Node;

/// A node of the reconstructed tree together with its visible children.
///
/// Tree views are rebuilt from scratch on every graph query and are plain
/// owned values: holding one never blocks or observes later updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    node: Node,
    children: Vec<TreeNode>,
}

impl TreeNode {
    pub(crate) fn new(node: Node, children: Vec<TreeNode>) -> Self {
        Self { node, children }
    }

    /// Returns the graph node at this position.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Returns the id of the graph node at this position.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        self.node.id()
    }

    /// Returns the visible children, in edge insertion order.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Returns true if no child is visible under this node.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of nodes in this subtree, itself included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend(current.children.iter());
        }
        count
    }

    /// Depth-first (pre-order) search for the first subtree rooted at `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            if current.id().as_str() == id {
                return Some(current);
            }
            stack.extend(current.children.iter().rev());
        }
        None
    }

    /// Returns every `(parent, child)` pair in depth-first pre-order.
    #[must_use]
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::new();
        let mut stack: Vec<(Option<&NodeId>, &TreeNode)> = vec![(None, self)];
        while let Some((parent, current)) = stack.pop() {
            if let Some(parent) = parent {
                pairs.push((parent.clone(), current.id().clone()));
            }
            stack.extend(
                current
                    .children
                    .iter()
                    .rev()
                    .map(|child| (Some(current.id()), child)),
            );
        }
        pairs
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -> [", self.node)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str("]")
    }
}
