//! LWW-Element-Graph: a replicated tree of nodes and directed edges.
//!
//! Nodes and edges live in two independent [`ElementSet`]s. The graph never
//! stores a tree: every query rebuilds one from current edge membership,
//! starting at a sentinel root that exists in every replica. The rebuild is
//! deliberately lossy:
//!
//! - an edge touching a node that is not currently a member (an orphan) is
//!   skipped, so removing a node hides its whole subtree;
//! - a node claimed by more than one parent edge is left out entirely, along
//!   with its subtree.
//!
//! Hidden parts keep their add/remove state and reappear once a later update
//! resolves the conflict.
//!
//! The graph has no lock of its own. `add_node` and `remove_node` update the
//! node set and then the edge set, each under that set's lock, so a
//! concurrent reader may observe the node without its edge or vice versa.

use std::collections::{HashMap, HashSet};
use std::fmt;

use lwwes_types::{NodeId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::Element;
use crate::element_set::ElementSet;
use crate::error::{GraphError, GraphResult};
use crate::tree::TreeNode;

/// A graph node. Two nodes are the same node iff their ids are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
}

impl Node {
    /// Creates a node with the given id.
    #[must_use]
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self { id: id.into() }
    }

    /// Returns the sentinel root node.
    #[must_use]
    pub fn root() -> Self {
        Self { id: NodeId::root() }
    }

    /// Returns the node's id.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns true if this is the sentinel root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }
}

impl From<NodeId> for Node {
    fn from(id: NodeId) -> Self {
        Self { id }
    }
}

impl From<&str> for Node {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node: {}", self.id)
    }
}

/// A directed parent-to-child edge. Equal iff both endpoints are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    from: Node,
    to: Node,
}

impl Edge {
    /// Creates a `from -> to` edge.
    #[must_use]
    pub fn new(from: Node, to: Node) -> Self {
        Self { from, to }
    }

    /// Returns the parent end.
    #[must_use]
    pub fn from(&self) -> &Node {
        &self.from
    }

    /// Returns the child end.
    #[must_use]
    pub fn to(&self) -> &Node {
        &self.to
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge: ({}) -> ({})", self.from, self.to)
    }
}

/// A replicated tree graph with a fixed root.
#[derive(Debug, Clone)]
pub struct Graph {
    root: Node,
    nodes: ElementSet<Node>,
    edges: ElementSet<Edge>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates a graph containing only the sentinel root.
    #[must_use]
    pub fn new() -> Self {
        let root = Node::root();
        let nodes = ElementSet::new();
        nodes.add_data(root.clone(), Timestamp::MIN_ROOT);

        Self {
            root,
            nodes,
            edges: ElementSet::new(),
        }
    }

    /// Returns the sentinel root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns true if a node with `id` is currently a member of the node set.
    ///
    /// Membership is independent of visibility: a member node can still be
    /// hidden from the tree view.
    #[must_use]
    pub fn contains_node(&self, id: impl AsRef<str>) -> bool {
        self.nodes.contains(&Node::new(id.as_ref()))
    }

    /// Returns the winning add entry for the node with `id`, if it is a member.
    #[must_use]
    pub fn node_entry(&self, id: impl AsRef<str>) -> Option<Element<Node>> {
        self.nodes.lookup(&Node::new(id.as_ref()))
    }

    /// Returns a snapshot of every member edge, in insertion order.
    ///
    /// The underlying element sets are never handed out, so the root cannot
    /// be tombstoned by bypassing [`Graph::remove_node`].
    #[must_use]
    pub fn member_edges(&self) -> Vec<Element<Edge>> {
        self.edges.lookup_all()
    }

    /// Adds `node` under `parent` at `timestamp`.
    ///
    /// The node and the `parent -> node` edge are both written with the same
    /// timestamp. Fails with [`GraphError::ReservedNode`] if `node` is the root.
    pub fn add_node(
        &self,
        node: impl Into<Node>,
        parent: impl Into<Node>,
        timestamp: impl Into<Timestamp>,
    ) -> GraphResult<()> {
        let node = Self::ensure_not_root(node.into())?;
        let timestamp = timestamp.into();

        self.nodes.add_data(node.clone(), timestamp);
        self.edges.add_data(Edge::new(parent.into(), node), timestamp);
        Ok(())
    }

    /// Removes `node` and its `parent -> node` edge at `timestamp`.
    ///
    /// Descendants are not removed; they drop out of the tree view because
    /// their parent becomes an orphan. Removes that predate the matching add
    /// are ignored. Fails with [`GraphError::ReservedNode`] if `node` is the root.
    pub fn remove_node(
        &self,
        node: impl Into<Node>,
        parent: impl Into<Node>,
        timestamp: impl Into<Timestamp>,
    ) -> GraphResult<()> {
        let node = Self::ensure_not_root(node.into())?;
        let timestamp = timestamp.into();

        self.nodes.remove_data(node.clone(), timestamp);
        self.edges.remove_data(Edge::new(parent.into(), node), timestamp);
        Ok(())
    }

    /// Returns the visible subtree rooted at `id`.
    ///
    /// Returns `None` straight away if `id` is not a member of the node set,
    /// and also when the node is a member but hidden from the tree view.
    #[must_use]
    pub fn query_node(&self, id: impl AsRef<str>) -> Option<TreeNode> {
        let id = id.as_ref();
        if !self.contains_node(id) {
            return None;
        }

        self.build_tree().find(id).cloned()
    }

    /// Returns the whole visible tree, starting at the root.
    #[must_use]
    pub fn query_all_nodes(&self) -> TreeNode {
        self.build_tree()
    }

    /// Merges another replica into this one. `other` is not modified.
    pub fn merge(&self, other: &Graph) {
        self.nodes.merge(&other.nodes);
        self.edges.merge(&other.edges);
    }

    fn ensure_not_root(node: Node) -> GraphResult<Node> {
        if node.is_root() {
            return Err(GraphError::ReservedNode(node.id));
        }
        Ok(node)
    }

    fn build_tree(&self) -> TreeNode {
        let edges = self.edges.lookup_all();

        // Orphans are endpoints missing from the node set. Computed in one
        // pass over member edges, not propagated down the tree.
        let mut membership: HashMap<&NodeId, bool> = HashMap::new();
        let mut in_degree: HashMap<&NodeId, usize> = HashMap::new();
        for edge in edges.iter().map(|element| element.data()) {
            for endpoint in [edge.from(), edge.to()] {
                membership
                    .entry(endpoint.id())
                    .or_insert_with(|| self.nodes.contains(endpoint));
            }
            *in_degree.entry(edge.to().id()).or_default() += 1;
        }

        let is_orphan = |node: &Node| !membership.get(node.id()).copied().unwrap_or(false);
        let parents = |node: &Node| in_degree.get(node.id()).copied().unwrap_or(0);

        let mut adjacency: HashMap<&NodeId, Vec<&Node>> = HashMap::new();
        let mut excluded = 0usize;
        for edge in edges.iter().map(|element| element.data()) {
            if is_orphan(edge.from())
                || is_orphan(edge.to())
                || parents(edge.from()) > 1
                || parents(edge.to()) > 1
            {
                excluded += 1;
                continue;
            }
            adjacency.entry(edge.from().id()).or_default().push(edge.to());
        }

        debug!(
            edges = edges.len(),
            orphans = membership.values().filter(|member| !**member).count(),
            excluded,
            "rebuilt tree view"
        );

        let mut visited = HashSet::new();
        visited.insert(self.root.id().clone());
        grow(&self.root, &adjacency, &mut visited)
    }
}

fn grow(
    node: &Node,
    adjacency: &HashMap<&NodeId, Vec<&Node>>,
    visited: &mut HashSet<NodeId>,
) -> TreeNode {
    let mut children = Vec::new();
    for child in adjacency.get(node.id()).into_iter().flatten() {
        if visited.insert(child.id().clone()) {
            children.push(grow(child, adjacency, visited));
        }
    }
    TreeNode::new(node.clone(), children)
}
