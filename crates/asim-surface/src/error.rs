//! Surface-subsystem error type.

use thiserror::Error;

use asim_core::NodeId;

/// Errors produced by `asim-surface`.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in surface graph")]
    NodeNotFound(NodeId),

    #[error("link {0:?} needs at least two nodes")]
    MalformedLink(String),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
