//! Last-Writer-Wins element set and replicated tree graph.
//!
//! This crate provides Conflict-free Replicated Data Types built on
//! caller-supplied timestamps:
//!
//! - [`Element<T>`] - a payload paired with the timestamp it was written at
//! - [`Set<T, Q>`] - a list of LWW registers, one per distinct payload
//! - [`ElementSet<T, Q>`] - two-phase add/remove set (LWW-Element-Set)
//! - [`Graph`] - tree-shaped graph of nodes and edges built from two element sets
//!
//! Merging satisfies the usual CRDT laws:
//! - **Commutative**: merge(a, b) == merge(b, a)
//! - **Associative**: merge(merge(a, b), c) == merge(a, merge(b, c))
//! - **Idempotent**: merge(a, a) == a
//!
//! Removed elements are kept as tombstones forever; there is no garbage
//! collection.

mod element;
mod element_set;
mod error;
mod graph;
mod set;
mod tree;

pub use element::Element;
pub use element_set::ElementSet;
pub use error::{GraphError, GraphResult};
pub use graph::{Edge, Graph, Node};
pub use set::{Equivalence, PartialEquivalence, Set};
pub use tree::TreeNode;

pub use lwwes_types::{NodeId, Timestamp};
