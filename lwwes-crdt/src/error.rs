//! Error types for graph operations.

use lwwes_types::NodeId;
use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur in graph operations.
///
/// Rejected removals and query misses are not errors: they are ordinary
/// outcomes of replicated state and show up as `false` or `None`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The sentinel root cannot be added or removed by callers.
    #[error("node id {0} is reserved for the graph root")]
    ReservedNode(NodeId),
}
