//! Navigation of materialized trees by key.

use crate::error::{PathError, ResolveError};
use crate::node::{Directory, MetadataNode};
use crate::path::Path;

/// Look up a `/`-delimited key in a directory.
///
/// Each segment must name a child of the directory reached so far. The
/// terminal node is returned as-is, so the result may be a leaf or a
/// sub-directory.
///
/// # Errors
///
/// * [`ResolveError::EmptyKey`] - `key` is `""`, whatever the tree holds.
/// * [`ResolveError::InvalidPath`] - `key` contains an empty segment.
/// * [`ResolveError::NotFound`] - a segment is absent; names that segment.
/// * [`ResolveError::TypeMismatch`] - a segment was looked up inside a leaf;
///   names that segment.
pub fn resolve<'a>(tree: &'a Directory, key: &str) -> Result<&'a MetadataNode, ResolveError> {
    let path = parse_key(key)?;
    walk(tree, &path)
}

pub(crate) fn resolve_from<'a>(
    node: &'a MetadataNode,
    key: &str,
) -> Result<&'a MetadataNode, ResolveError> {
    let path = parse_key(key)?;
    match node {
        MetadataNode::Directory(children) => walk(children, &path),
        MetadataNode::Leaf(_) => Err(ResolveError::TypeMismatch {
            segment: path[0].clone(),
            actual: node.kind(),
        }),
    }
}

fn parse_key(key: &str) -> Result<Path, ResolveError> {
    match Path::parse(key) {
        Ok(path) => Ok(path),
        Err(PathError::Empty) => Err(ResolveError::EmptyKey),
        Err(e) => Err(ResolveError::InvalidPath(e)),
    }
}

fn walk<'a>(root: &'a Directory, path: &Path) -> Result<&'a MetadataNode, ResolveError> {
    let mut children = root;
    let mut found: Option<&'a MetadataNode> = None;

    for segment in path.iter() {
        if let Some(node) = found {
            children = match node {
                MetadataNode::Directory(next) => next,
                MetadataNode::Leaf(_) => {
                    return Err(ResolveError::TypeMismatch {
                        segment: segment.clone(),
                        actual: node.kind(),
                    })
                }
            };
        }

        found = Some(children.get(segment).ok_or_else(|| ResolveError::NotFound {
            segment: segment.clone(),
        })?);
    }

    // Parsed paths have at least one segment.
    found.ok_or(ResolveError::EmptyKey)
}
