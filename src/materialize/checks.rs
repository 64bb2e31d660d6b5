//! Strict type checks shared by loading, defaults, captured arguments and `replace`
//!
//! No implicit coercion happens anywhere: an integer is never a float, a
//! string is never a number.

use crate::document::Node;
use crate::error::{ConfError, Result};
use crate::instance::Value;
use crate::schema::{ElementType, FieldDescriptor, FieldType, ScalarKind};

/// Check a document scalar against a declared kind, dropping any tag
///
/// # Errors
///
/// Returns a loading error naming `path` if the concrete type differs.
#[inline]
pub fn scalar(kind: ScalarKind, node: &Node, path: &str) -> Result<Value> {
    match (kind, node.untagged()) {
        (ScalarKind::String, &Node::Str(ref s)) => Ok(Value::Str(s.clone())),
        (ScalarKind::Integer, &Node::Int(i)) => Ok(Value::Int(i)),
        (ScalarKind::Float, &Node::Float(f)) => Ok(Value::Float(f)),
        (ScalarKind::Bool, &Node::Bool(b)) => Ok(Value::Bool(b)),
        (_, other) => Err(ConfError::loading(
            path,
            format!(
                "invalid type, expected {} got {}",
                kind.label(),
                other.kind_name()
            ),
        )),
    }
}

/// True if `value` may serve as a default or captured argument for `ty`
///
/// Nested types accept an instance of the same type, or a scalar when the
/// nested type declares a scalar shorthand. Lists of nested types also accept
/// raw mappings, which are loaded like document content.
#[must_use]
#[inline]
pub fn default_matches(ty: &FieldType, value: &Value) -> bool {
    match *ty {
        FieldType::Scalar(kind) => kind.matches(value),
        FieldType::Nested(ref schema) => match *value {
            Value::Object(ref instance) => instance.schema().is_same_type(schema),
            ref other => other.is_scalar() && schema.supports_scalar(),
        },
        FieldType::List(ref element) => value
            .as_list()
            .is_some_and(|items| items.iter().all(|item| element_matches(element, item))),
        FieldType::Map => matches!(*value, Value::Map(_)),
    }
}

fn element_matches(element: &ElementType, value: &Value) -> bool {
    match *element {
        ElementType::Any => true,
        ElementType::Scalar(kind) => kind.matches(value),
        ElementType::Nested(ref schema) => match *value {
            Value::Object(ref instance) => instance.schema().is_same_type(schema),
            Value::Map(_) => true,
            ref other => other.is_scalar() && schema.supports_scalar(),
        },
    }
}

/// Check a value handed to `replace`
///
/// Nested values must be loaded instances of the declared type.
///
/// # Errors
///
/// Returns a loading error naming `path` if the value does not fit.
#[inline]
pub fn replacement(field: &FieldDescriptor, value: &Value, path: &str) -> Result<()> {
    let fits = match (field.ty(), value) {
        (&FieldType::Nested(ref schema), &Value::Object(ref instance)) => {
            instance.schema().is_same_type(schema) && instance.is_loaded()
        }
        (&FieldType::Nested(_), _) => false,
        (&FieldType::List(ElementType::Nested(ref schema)), &Value::List(ref items)) => {
            items.iter().all(|item| {
                item.as_object().is_some_and(|instance| {
                    instance.schema().is_same_type(schema) && instance.is_loaded()
                })
            })
        }
        (ty, _) => default_matches(ty, value),
    };

    if fits {
        return Ok(());
    }
    let got = match *value {
        Value::Object(ref instance) if !instance.is_loaded() => {
            format!("unloaded {}", instance.type_name())
        }
        ref other => describe(other),
    };
    Err(ConfError::loading(
        path,
        format!("invalid type, expected {} got {got}", field.ty().label()),
    ))
}

/// Kind of a value for diagnostics, naming the type of an instance
#[must_use]
#[inline]
pub fn describe(value: &Value) -> String {
    match *value {
        Value::Object(ref instance) => instance.type_name().to_owned(),
        ref other => other.kind_name().to_owned(),
    }
}
