//! Core type definitions for the LWW element set and graph.
//!
//! This crate defines the small, payload-agnostic types shared by the CRDT
//! crate:
//! - Logical timestamps supplied by callers
//! - Node identifiers for the replicated tree graph
//!
//! The CRDT types themselves live in `lwwes-crdt`.

mod ids;
mod timestamp;

pub use ids::NodeId;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid node id: {0:?}")]
    InvalidNodeId(String),
}
