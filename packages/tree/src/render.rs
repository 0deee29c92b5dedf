//! Rendering of trees to indented JSON text.

use crate::error::RenderError;
use crate::node::MetadataNode;

/// Convert a node to a `serde_json::Value`.
///
/// Directories become objects, leaves become strings.
pub fn to_json(node: &MetadataNode) -> serde_json::Value {
    match node {
        MetadataNode::Leaf(value) => serde_json::Value::String(value.clone()),
        MetadataNode::Directory(children) => serde_json::Value::Object(
            children
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Render a node as pretty JSON with two-space indentation.
pub fn render(node: &MetadataNode) -> Result<String, RenderError> {
    render_value(&to_json(node))
}

/// Render an arbitrary JSON document the same way as [`render`].
///
/// Used for documents whose shape is owned by someone else, such as remote
/// instance descriptions.
pub fn render_value(value: &serde_json::Value) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(value)?)
}
