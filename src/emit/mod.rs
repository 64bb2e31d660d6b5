//! Emitter: convert loaded instances back into document nodes
//!
//! The output mirrors the schema: one key per field in declaration order,
//! nested instances as nested mappings, everything else copied by value. In
//! documentation mode every key gets a comment block with the field name, its
//! type label and its documentation text. A nested field's block sits on the
//! key that opens the nested mapping; its children carry their own blocks.

use crate::document::{Mapping, Node};
use crate::error::Result;
use crate::instance::{Instance, Value};
use crate::schema::FieldDescriptor;

/// Convert a loaded instance into a mapping node
///
/// # Errors
///
/// Returns an error if the instance, or any nested instance, is not loaded.
#[inline]
pub fn save(instance: &Instance, documentation: bool) -> Result<Node> {
    emit_instance(instance, documentation).map(Node::Map)
}

fn emit_instance(instance: &Instance, documentation: bool) -> Result<Mapping> {
    let mut map = Mapping::new();
    for (field, value) in instance.iter()? {
        let node = match *value {
            Value::Object(ref nested) => Node::Map(emit_instance(nested, documentation)?),
            ref other => value_to_node(other)?,
        };
        if documentation {
            map.insert_commented(field.name(), node, comment_block(field));
        } else {
            map.insert(field.name(), node);
        }
    }
    Ok(map)
}

/// Convert a runtime value into a document node, without comments
///
/// # Errors
///
/// Returns an error if the value contains an instance that is not loaded.
#[inline]
pub fn value_to_node(value: &Value) -> Result<Node> {
    Ok(match *value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Int(i) => Node::Int(i),
        Value::Float(f) => Node::Float(f),
        Value::Str(ref s) => Node::Str(s.clone()),
        Value::List(ref items) => Node::Seq(
            items
                .iter()
                .map(value_to_node)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Map(ref entries) => {
            let mut map = Mapping::new();
            for &(ref key, ref item) in entries {
                map.insert(key.clone(), value_to_node(item)?);
            }
            Node::Map(map)
        }
        Value::Object(ref instance) => Node::Map(emit_instance(instance, false)?),
    })
}

/// Comment block placed before a field's key
///
/// Starts with an empty line so consecutive blocks stay visually apart.
#[must_use]
#[inline]
pub fn comment_block(field: &FieldDescriptor) -> String {
    let mut block = format!(
        "\n### {} ###\ntype: {}",
        field.name(),
        field.ty().label()
    );
    if let Some(doc) = field.doc() {
        for line in doc.trim().lines() {
            block.push('\n');
            block.push_str(line.trim());
        }
    }
    block
}
