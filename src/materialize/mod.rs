//! Materializer: reconcile a document node against a schema
//!
//! Loading walks the schema, not the document. Every declared field is
//! resolved from, in order of precedence, the document, the instance's
//! captured construction arguments, and the field's default. Document keys
//! without a field are logged and otherwise ignored.
//!
//! Missing required fields are collected across the whole tree and reported
//! together once the walk completes; type and shape mismatches fail
//! immediately. The target instance is only replaced when the whole tree
//! loaded, so a failed load leaves it unloaded and unchanged.

pub mod checks;

use crate::document::{Mapping, Node};
use crate::emit;
use crate::error::{ConfError, Result};
use crate::instance::{Instance, Value};
use crate::schema::{ElementType, FieldDescriptor, FieldType, Schema};
use std::sync::Arc;
use tracing::{debug, info};

/// Load a document node into an instance
///
/// A `null` node is treated as an empty mapping.
///
/// # Errors
///
/// Returns an error if:
/// - The node shape or a value type does not match the schema
/// - One or more required fields are missing (all of them are reported)
#[inline]
pub fn load(instance: &mut Instance, node: &Node) -> Result<()> {
    let empty = Node::empty_map();
    let node = if matches!(*node, Node::Null) { &empty } else { node };

    let mut materializer = Materializer::default();
    let loaded = materializer.materialize(instance.clone(), node, "root")?;
    if !materializer.missing.is_empty() {
        return Err(ConfError::missing(materializer.missing));
    }

    *instance = loaded;
    Ok(())
}

/// Recursive walk state
#[derive(Debug, Default)]
struct Materializer {
    missing: Vec<String>,
}

impl Materializer {
    fn materialize(&mut self, mut target: Instance, node: &Node, path: &str) -> Result<Instance> {
        let schema = Arc::clone(target.schema());
        debug!("materializing {} at {path}", schema.name());

        let values = match *node.untagged() {
            Node::Map(ref map) => {
                if let (_, Some(tag)) = node.split_tag() {
                    debug!("ignoring tag !{tag} on mapping at {path}");
                }
                let values = self.resolve_mapping(&schema, &target, map, path)?;
                for entry in map {
                    if schema.field(&entry.key).is_none() {
                        info!("unused config {path}.{} = {}", entry.key, entry.value);
                    }
                }
                values
            }
            ref bare if bare.is_scalar() => self.resolve_scalar(&schema, &target, node, path)?,
            ref other => {
                return Err(ConfError::loading(
                    path,
                    format!(
                        "invalid type, expected mapping or scalar for {} got {}",
                        schema.name(),
                        other.kind_name()
                    ),
                ));
            }
        };

        target.seal(values);
        Ok(target)
    }

    fn resolve_mapping(
        &mut self,
        schema: &Schema,
        target: &Instance,
        map: &Mapping,
        path: &str,
    ) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(schema.fields().len());

        for field in schema.fields() {
            let field_path = format!("{path}.{}", field.name());
            let provided = map.get(field.name());
            let fallback = || {
                target
                    .captured_arg(field.name())
                    .cloned()
                    .or_else(|| field.default_value())
            };

            let value = match *field.ty() {
                FieldType::Nested(ref nested) => {
                    self.resolve_nested(nested, provided, fallback(), &field_path)?
                }
                FieldType::List(ref element) => match provided {
                    Some(node) => self.resolve_list(element, node, &field_path)?,
                    None => self.list_fallback(field, element, fallback(), &field_path)?,
                },
                FieldType::Map => match provided {
                    Some(node) => match *node.untagged() {
                        Node::Map(_) => Value::from_node(node),
                        ref other => {
                            return Err(ConfError::loading(
                                &field_path,
                                format!("invalid type, expected Mapping got {}", other.kind_name()),
                            ));
                        }
                    },
                    None => self.required(fallback(), field_path),
                },
                FieldType::Scalar(kind) => match provided {
                    Some(node) => checks::scalar(kind, node, &field_path)?,
                    None => self.required(fallback(), field_path),
                },
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Scalar shorthand: the scalar fills the `if_scalar` field, a tag may
    /// select further fields, everything else takes its default
    fn resolve_scalar(
        &mut self,
        schema: &Schema,
        target: &Instance,
        node: &Node,
        path: &str,
    ) -> Result<Vec<Value>> {
        let Some(shorthand) = schema.if_scalar() else {
            return Err(ConfError::loading(
                path,
                format!(
                    "scalar value {node} found, but if_scalar not set in {}",
                    schema.name()
                ),
            ));
        };

        let (bare, tag) = node.split_tag();
        let rule = tag.and_then(|tag| {
            let rule = schema.tag(tag);
            if rule.is_none() {
                debug!("unknown tag !{tag} for {} at {path}", schema.name());
            }
            rule
        });

        let mut values = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let field_path = format!("{path}.{}", field.name());
            let value = if field.name() == shorthand {
                match *field.ty() {
                    FieldType::Scalar(kind) => checks::scalar(kind, bare, &field_path)?,
                    _ => Value::from_node(bare),
                }
            } else if let Some(rule) = rule.filter(|rule| rule.target_field() == field.name()) {
                rule.assigned_value()
            } else {
                let fallback = target
                    .captured_arg(field.name())
                    .cloned()
                    .or_else(|| field.default_value());
                self.required(fallback, field_path)
            };
            values.push(value);
        }

        Ok(values)
    }

    fn resolve_nested(
        &mut self,
        nested: &Arc<Schema>,
        provided: Option<&Node>,
        fallback: Option<Value>,
        path: &str,
    ) -> Result<Value> {
        // A scalar default feeds a shorthand child as if it were document input
        let (target, default_node) = match fallback {
            Some(Value::Object(prototype)) => {
                (checked_prototype(nested, &prototype, path)?, None)
            }
            Some(value) if nested.supports_scalar() && value.is_scalar() => {
                (Instance::new(Arc::clone(nested)), Some(emit::value_to_node(&value)?))
            }
            Some(_) | None => (Instance::new(Arc::clone(nested)), None),
        };

        let empty = Node::empty_map();
        let sub_node = provided.or(default_node.as_ref()).unwrap_or(&empty);
        self.materialize(target, sub_node, path).map(Value::Object)
    }

    fn resolve_list(&mut self, element: &ElementType, node: &Node, path: &str) -> Result<Value> {
        let Some(items) = node.as_sequence() else {
            return Err(ConfError::loading(
                path,
                format!("invalid type, expected sequence got {}", node.kind_name()),
            ));
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}.{i}");
            out.push(match *element {
                ElementType::Nested(ref schema) => Value::Object(self.materialize(
                    Instance::new(Arc::clone(schema)),
                    item,
                    &item_path,
                )?),
                ElementType::Scalar(kind) => checks::scalar(kind, item, &item_path)?,
                ElementType::Any => Value::from_node(item),
            });
        }
        Ok(Value::List(out))
    }

    fn list_fallback(
        &mut self,
        field: &FieldDescriptor,
        element: &ElementType,
        fallback: Option<Value>,
        path: &str,
    ) -> Result<Value> {
        let ElementType::Nested(ref schema) = *element else {
            return Ok(self.required(fallback, path.to_owned()));
        };

        // Default elements of a confclass list are loaded like document items
        let Some(Value::List(items)) = fallback else {
            debug!("no default for {}, using an empty list", field.name());
            return Ok(Value::List(Vec::new()));
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let item_path = format!("{path}.{i}");
            let loaded = match item {
                Value::Object(prototype) => self.materialize(
                    checked_prototype(schema, &prototype, &item_path)?,
                    &Node::empty_map(),
                    &item_path,
                )?,
                raw => {
                    let node = emit::value_to_node(&raw)?;
                    self.materialize(Instance::new(Arc::clone(schema)), &node, &item_path)?
                }
            };
            out.push(Value::Object(loaded));
        }
        Ok(Value::List(out))
    }

    /// Use the fallback, or record the path as missing
    fn required(&mut self, fallback: Option<Value>, path: String) -> Value {
        fallback.unwrap_or_else(|| {
            debug!("missing required config field {path}");
            self.missing.push(path);
            Value::Null
        })
    }
}

/// Unloaded copy of a default instance, which must be of the declared type
fn checked_prototype(declared: &Schema, prototype: &Instance, path: &str) -> Result<Instance> {
    if !prototype.schema().is_same_type(declared) {
        return Err(ConfError::loading(
            path,
            format!(
                "invalid default, expected {} got {}",
                declared.name(),
                prototype.type_name()
            ),
        ));
    }
    Ok(prototype.as_prototype())
}
