//! Schemas declared at runtime in a YAML definition file
//!
//! A definition names a set of types and the root type a config file is
//! loaded as:
//!
//! ```yaml
//! root: App
//! types:
//!   App:
//!     fields:
//!       - name: port
//!         type: Integer
//!         default: 8080
//!       - name: hosts
//!         type: List[Host]
//!   Host:
//!     if_scalar: address
//!     fields:
//!       - name: address
//!         type: String
//! ```
//!
//! Definitions are compiled through the same [`SchemaBuilder`] as compiled
//! types, so every declaration rule applies to them unchanged.

pub mod validation;

use crate::document::{Node, yaml};
use crate::error::{ConfError, Result};
use crate::instance::{Instance, Value};
use crate::schema::{FieldSpec, ScalarKind, Schema, SchemaBuilder};
use crate::system::System;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Top-level definition file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Type a config file is loaded as
    pub root: String,

    /// Declared types by name
    pub types: BTreeMap<String, TypeDefinition>,
}

/// One declared configuration type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_scalar: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagDefinition>,

    pub fields: Vec<FieldDefinition>,
}

/// A tag accepted on the scalar shorthand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagDefinition {
    pub name: String,

    /// Field assigned by the tag, defaults to the tag name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default)]
    pub flag: bool,
}

/// A declared field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,

    /// Type expression: `String`, `Integer`, `Float`, `Bool`, `List`,
    /// `Mapping`, `List[T]` or the name of another declared type
    #[serde(rename = "type")]
    pub type_expr: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Parsed field type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Scalar(ScalarKind),
    AnyList,
    Mapping,
    List(Box<TypeExpr>),
    Named(String),
}

impl TypeExpr {
    /// Parse a type expression
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A type name is not an identifier
    /// - A list element is itself a list or a mapping
    #[inline]
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();

        if let Some(inner) = expr
            .strip_prefix("List[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return match Self::parse(inner)? {
                element @ (Self::Scalar(_) | Self::Named(_)) => Ok(Self::List(Box::new(element))),
                _ => Err(ConfError::setup(format!(
                    "Unsupported list element in '{expr}': elements must be a scalar or a named type"
                ))),
            };
        }

        match expr {
            "List" => Ok(Self::AnyList),
            "Mapping" => Ok(Self::Mapping),
            other => {
                if let Some(kind) = ScalarKind::from_label(other) {
                    return Ok(Self::Scalar(kind));
                }
                validation::validate_identifier("type", other)?;
                Ok(Self::Named(other.to_owned()))
            }
        }
    }
}

/// Compiled schemas of a definition file
#[derive(Debug, Clone)]
pub struct SchemaSet {
    root: Arc<Schema>,
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaSet {
    /// Compile a parsed definition
    ///
    /// # Errors
    ///
    /// Returns a setup error if:
    /// - A name is invalid or the root type is not defined
    /// - A type references an undefined type or nests itself
    /// - Any type breaks a declaration rule
    #[inline]
    pub fn from_definition(definition: &SchemaDefinition) -> Result<Self> {
        validation::validate_definition(definition)?;

        let mut compiler = Compiler {
            definition,
            built: HashMap::new(),
            visiting: Vec::new(),
        };
        for name in definition.types.keys() {
            compiler.compile(name)?;
        }

        let root = compiler
            .built
            .get(&definition.root)
            .cloned()
            .ok_or_else(|| {
                ConfError::setup(format!("Root type '{}' is not defined", definition.root))
            })?;

        debug!(
            "Compiled {} type(s), root {}",
            compiler.built.len(),
            definition.root
        );

        Ok(Self {
            root,
            schemas: compiler.built,
        })
    }

    /// Parse, validate and compile a definition document
    ///
    /// # Errors
    ///
    /// Returns a setup error if the text is not valid YAML, breaks the
    /// definition schema, or fails to compile.
    #[inline]
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| ConfError::setup(format!("Failed to parse schema definition: {e}")))?;

        let json = serde_json::to_value(&raw).map_err(|e| {
            ConfError::setup(format!("Failed to convert schema definition: {e}"))
        })?;
        validation::validate_against_schema(&json)?;

        let definition: SchemaDefinition = serde_yaml::from_value(raw)
            .map_err(|e| ConfError::setup(format!("Invalid schema definition: {e}")))?;

        Self::from_definition(&definition)
    }

    /// Read and compile a definition file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (filesystem error)
    /// - The definition is invalid (setup error)
    #[inline]
    pub fn from_file(system: &dyn System, path: &Path) -> Result<Self> {
        let text = system.read_to_string(path).map_err(|e| {
            ConfError::filesystem(format!(
                "Failed to read schema definition {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Schema of the root type
    #[must_use]
    #[inline]
    pub const fn root(&self) -> &Arc<Schema> {
        &self.root
    }

    /// Schema of a declared type
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Names of all declared types, sorted
    #[must_use]
    #[inline]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Fresh unloaded instance of a declared type, or of the root when
    /// `name` is `None`
    ///
    /// # Errors
    ///
    /// Returns a setup error if the type is not declared.
    #[inline]
    pub fn construct(&self, name: Option<&str>) -> Result<Instance> {
        let schema = match name {
            Some(name) => self
                .get(name)
                .ok_or_else(|| ConfError::setup(format!("Unknown type '{name}'")))?,
            None => &self.root,
        };
        Ok(Instance::new(Arc::clone(schema)))
    }
}

struct Compiler<'a> {
    definition: &'a SchemaDefinition,
    built: HashMap<String, Arc<Schema>>,
    visiting: Vec<String>,
}

impl Compiler<'_> {
    fn compile(&mut self, name: &str) -> Result<Arc<Schema>> {
        if let Some(schema) = self.built.get(name) {
            return Ok(Arc::clone(schema));
        }

        if let Some(start) = self.visiting.iter().position(|v| v == name) {
            let mut cycle = self.visiting[start..].to_vec();
            cycle.push(name.to_owned());
            return Err(ConfError::setup(format!(
                "Type {name} nests itself: {}",
                cycle.join(" -> ")
            )));
        }

        let definition = self.definition;
        let ty = definition
            .types
            .get(name)
            .ok_or_else(|| ConfError::setup(format!("Unknown type '{name}'")))?;

        self.visiting.push(name.to_owned());

        let mut builder = SchemaBuilder::new(name);
        for field in &ty.fields {
            builder = builder.field(self.field_spec(name, field)?);
        }
        if let Some(shorthand) = ty.if_scalar.as_deref() {
            builder = builder.if_scalar(shorthand);
        }
        for tag in &ty.tags {
            builder = builder.tag(tag.name.as_str(), tag.target.as_deref(), tag.flag);
        }

        self.visiting.pop();

        let schema = Arc::new(builder.build()?);
        self.built.insert(name.to_owned(), Arc::clone(&schema));
        Ok(schema)
    }

    fn field_spec(&mut self, owner: &str, field: &FieldDefinition) -> Result<FieldSpec> {
        let name = field.name.as_str();
        let expr = TypeExpr::parse(&field.type_expr)
            .map_err(|e| e.in_context(format!("Field {owner}.{name}")))?;

        let mut nested = None;
        let mut spec = match expr {
            TypeExpr::Scalar(kind) => FieldSpec::scalar(name, kind),
            TypeExpr::AnyList => FieldSpec::any_list(name),
            TypeExpr::Mapping => FieldSpec::mapping(name),
            TypeExpr::Named(ref target) => {
                let schema = self.compile(target)?;
                nested = Some(Arc::clone(&schema));
                FieldSpec::nested_schema(name, schema)
            }
            TypeExpr::List(element) => match *element {
                TypeExpr::Scalar(kind) => FieldSpec::list(name, kind),
                TypeExpr::Named(ref target) => {
                    FieldSpec::list_of_schema(name, self.compile(target)?)
                }
                _ => {
                    return Err(ConfError::setup(format!(
                        "Field {owner}.{name}: unsupported list element"
                    )));
                }
            },
        };

        if let Some(default) = field.default.clone() {
            let node = yaml::from_yaml_value(default, &format!("{owner}.{name}")).map_err(|e| {
                ConfError::setup(format!("Field {owner}.{name}: invalid default: {e}"))
            })?;
            spec = match (nested, node) {
                (Some(schema), Node::Map(map)) => {
                    let args: Vec<(String, Value)> = map
                        .iter()
                        .map(|entry| (entry.key.clone(), Value::from_node(&entry.value)))
                        .collect();
                    spec.default_prototype(schema, args)
                }
                (_, node) => spec.default(Value::from_node(&node)),
            };
        }

        if let Some(doc) = field.doc.as_deref() {
            spec = spec.doc(doc);
        }

        Ok(spec)
    }
}
