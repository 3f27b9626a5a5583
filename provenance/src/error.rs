use thiserror::Error;

use crate::tree::NodeId;

/// Errors that can occur when mutating the provenance tree. A failed
/// operation leaves the registry untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Referenced node is not in the registry.
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Node is in a split state that does not allow the operation.
    #[error("node {node} conflict: {reason}")]
    Conflict { node: NodeId, reason: &'static str },

    /// A required earlier step has not happened yet.
    #[error("node {node} precondition failed: {reason}")]
    Precondition { node: NodeId, reason: &'static str },
}
