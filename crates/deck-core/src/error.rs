use crate::types::NodeId;
use thiserror::Error;

/// Errors surfaced by the presentation model.
///
/// Almost all of these are caller mistakes (bad indices, mismatched arrays,
/// stale handles). They are returned rather than retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeckError {
    #[error("layer index {index} out of range (presentation has {len} layers)")]
    LayerOutOfRange { index: usize, len: usize },

    #[error("frame index {index} out of range (presentation has {len} frames)")]
    FrameOutOfRange { index: usize, len: usize },

    #[error("expected {expected} per-layer entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("entity is not attached to this presentation")]
    Detached,

    #[error("frame {0} was created by another presentation")]
    ForeignFrame(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document root {0} is not a live element")]
    InvalidRoot(NodeId),

    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("cannot attach node {child} under {parent}")]
    InvalidHierarchy { parent: NodeId, child: NodeId },

    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DeckError>;
