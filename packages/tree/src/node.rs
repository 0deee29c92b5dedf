//! The MetadataNode type - a metadata namespace held in memory.
//!
//! A namespace entry is either a scalar string (a leaf) or a listing of
//! named children (a directory). Call sites match on the variant instead of
//! probing a dynamically-typed value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Children of a directory, keyed by name.
///
/// `BTreeMap` keeps rendering deterministic; the metadata service makes no
/// ordering promise of its own.
pub type Directory = BTreeMap<String, MetadataNode>;

/// One node of a materialized metadata tree.
///
/// Serializes untagged: a leaf is a JSON string and a directory a JSON
/// object, which is also the shape accepted when deserializing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataNode {
    /// A scalar value.
    Leaf(String),
    /// A listing of named children.
    Directory(Directory),
}

/// The variant of a [`MetadataNode`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => write!(f, "leaf"),
            NodeKind::Directory => write!(f, "directory"),
        }
    }
}

impl MetadataNode {
    /// Create a leaf node.
    pub fn leaf(value: impl Into<String>) -> Self {
        MetadataNode::Leaf(value.into())
    }

    /// Create an empty directory node.
    pub fn directory() -> Self {
        MetadataNode::Directory(Directory::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            MetadataNode::Leaf(_) => NodeKind::Leaf,
            MetadataNode::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MetadataNode::Leaf(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, MetadataNode::Directory(_))
    }

    /// The scalar value, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            MetadataNode::Leaf(value) => Some(value),
            MetadataNode::Directory(_) => None,
        }
    }

    /// The children, if this is a directory.
    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            MetadataNode::Leaf(_) => None,
            MetadataNode::Directory(children) => Some(children),
        }
    }

    /// Consume the node, returning its children if it is a directory.
    pub fn into_directory(self) -> Option<Directory> {
        match self {
            MetadataNode::Leaf(_) => None,
            MetadataNode::Directory(children) => Some(children),
        }
    }

    /// Resolve a `/`-delimited key relative to this node.
    ///
    /// See [`crate::resolve`] for the error semantics. Resolving any
    /// non-empty key against a leaf fails on the first segment.
    pub fn resolve(&self, key: &str) -> Result<&MetadataNode, ResolveError> {
        crate::resolve::resolve_from(self, key)
    }
}

impl From<&str> for MetadataNode {
    fn from(v: &str) -> Self {
        MetadataNode::Leaf(v.to_string())
    }
}

impl From<String> for MetadataNode {
    fn from(v: String) -> Self {
        MetadataNode::Leaf(v)
    }
}

impl From<Directory> for MetadataNode {
    fn from(v: Directory) -> Self {
        MetadataNode::Directory(v)
    }
}
