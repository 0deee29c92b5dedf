//! # imds-tree
//!
//! In-memory model of an instance metadata namespace:
//! - `MetadataNode`: a leaf value or a directory of named children
//! - `Path`: a validated, `/`-delimited sequence of non-empty segments
//! - `resolve`: navigate a materialized tree by a path string
//! - `render`: turn a tree into indented JSON for display
//!
//! Nothing in this crate performs I/O. Trees are built by `imds-http` and
//! owned by whoever asked for them.
//!
//! # Example
//!
//! ```rust
//! use imds_tree::{resolve, Directory, MetadataNode};
//!
//! let mut placement = Directory::new();
//! placement.insert("availability-zone".into(), MetadataNode::leaf("eu-west-1a"));
//!
//! let mut root = Directory::new();
//! root.insert("placement".into(), MetadataNode::Directory(placement));
//!
//! let zone = resolve(&root, "placement/availability-zone").unwrap();
//! assert_eq!(zone.as_leaf(), Some("eu-west-1a"));
//! ```

mod error;
mod node;
mod path;
pub mod render;
mod resolve;

pub use error::{PathError, RenderError, ResolveError};
pub use node::{Directory, MetadataNode, NodeKind};
pub use path::Path;
pub use render::{render, render_value, to_json};
pub use resolve::resolve;
