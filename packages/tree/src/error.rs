//! Error types for tree navigation and rendering.

use crate::node::NodeKind;

/// Errors produced while parsing a path string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("path is empty")]
    Empty,

    /// A segment between two delimiters was empty (`a//b`, `/a`, `a/`).
    #[error("empty path segment at position {position}")]
    EmptySegment { position: usize },
}

/// Errors produced while resolving a key against a tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("key is empty")]
    EmptyKey,

    #[error("invalid key: {0}")]
    InvalidPath(#[source] PathError),

    /// A segment is absent from the directory it was looked up in.
    #[error("key {segment:?} not found")]
    NotFound { segment: String },

    /// A segment was looked up inside something that is not a directory.
    #[error("expected map at {segment:?}, got {actual}")]
    TypeMismatch { segment: String, actual: NodeKind },
}

/// Errors produced while rendering a tree to text.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
