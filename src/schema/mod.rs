//! Schema descriptors
//!
//! A [`Schema`] is the per-type metadata that drives loading and saving: the
//! ordered fields with their declared types and defaults, the optional scalar
//! shorthand field, and the tag rules used when a tagged scalar is loaded
//! through the shorthand. Schemas are immutable once built.

pub mod builder;
pub mod registry;

pub use builder::{FieldSpec, SchemaBuilder};
pub use registry::{Confclass, build_schema, is_registered};

use crate::instance::Value;
use core::any::TypeId;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// Scalar types a field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Bool,
}

impl ScalarKind {
    /// Human label used in documentation comments
    #[must_use]
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Bool => "Bool",
        }
    }

    /// Parse a label back into a kind
    #[must_use]
    #[inline]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "String" => Some(Self::String),
            "Integer" => Some(Self::Integer),
            "Float" => Some(Self::Float),
            "Bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Exact match against a runtime value, no coercion
    #[must_use]
    #[inline]
    pub const fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, &Value::Str(_))
                | (Self::Integer, &Value::Int(_))
                | (Self::Float, &Value::Float(_))
                | (Self::Bool, &Value::Bool(_))
        )
    }
}

/// Element type of a list field
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ElementType {
    /// Untyped list, elements are kept as given
    Any,
    Scalar(ScalarKind),
    Nested(Arc<Schema>),
}

/// Declared type of a field
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum FieldType {
    Scalar(ScalarKind),
    /// A nested configuration type
    Nested(Arc<Schema>),
    List(ElementType),
    /// Untyped mapping, entries are kept as given
    Map,
}

impl FieldType {
    /// True if the field holds a nested configuration type
    #[must_use]
    #[inline]
    pub const fn is_confclass(&self) -> bool {
        matches!(*self, Self::Nested(_))
    }

    /// Human label used in documentation comments
    #[must_use]
    #[inline]
    pub fn label(&self) -> String {
        match *self {
            Self::Scalar(kind) => kind.label().to_owned(),
            Self::Nested(ref schema) => schema.name().to_owned(),
            Self::List(ElementType::Any) => "List".to_owned(),
            Self::List(ElementType::Scalar(kind)) => format!("List[{}]", kind.label()),
            Self::List(ElementType::Nested(ref schema)) => format!("List[{}]", schema.name()),
            Self::Map => "Mapping".to_owned(),
        }
    }
}

/// Producer of a fresh default value for every new instance
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Where a field's default comes from
#[derive(Clone)]
pub enum DefaultSource {
    /// An immutable scalar default, cloned on use
    Value(Value),
    /// A factory producing an independent value per instance
    Factory(DefaultFactory),
}

impl DefaultSource {
    /// Produce the default value for one instance
    #[must_use]
    #[inline]
    pub fn produce(&self) -> Value {
        match *self {
            Self::Value(ref value) => value.clone(),
            Self::Factory(ref factory) => factory(),
        }
    }
}

impl fmt::Debug for DefaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Value(ref value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Metadata for one declared field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    ty: FieldType,
    default: Option<DefaultSource>,
    doc: Option<String>,
}

impl FieldDescriptor {
    pub(crate) const fn new(
        name: String,
        ty: FieldType,
        default: Option<DefaultSource>,
        doc: Option<String>,
    ) -> Self {
        Self {
            name,
            ty,
            default,
            doc,
        }
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    #[inline]
    pub const fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Documentation text attached to the declaration
    #[must_use]
    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[must_use]
    #[inline]
    pub const fn default_source(&self) -> Option<&DefaultSource> {
        self.default.as_ref()
    }

    /// A fresh default value, if the field has one
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultSource::produce)
    }

    /// True if the field has neither a default nor a default factory
    #[must_use]
    #[inline]
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Maps a scalar tag to a field assignment during shorthand loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub name: String,
    /// Field to assign; the tag name itself when `None`
    pub target: Option<String>,
    /// Assign `true` instead of the tag name
    pub flag: bool,
}

impl TagRule {
    /// Field this rule assigns
    #[must_use]
    #[inline]
    pub fn target_field(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.name)
    }

    /// Value this rule assigns
    #[must_use]
    #[inline]
    pub fn assigned_value(&self) -> Value {
        if self.flag {
            Value::Bool(true)
        } else {
            Value::Str(self.name.clone())
        }
    }
}

/// Identity of a configuration type
///
/// Two schemas describe the same type exactly when their ids are equal. The
/// display name is not unique: `a::Config` and `b::Config` share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    /// A Rust type registered through [`Confclass`]
    Type(TypeId),
    /// A type built at runtime, unique for every [`SchemaBuilder`]
    Declared(u64),
}

/// Schema descriptor for one configuration type
#[derive(Debug)]
pub struct Schema {
    id: SchemaId,
    name: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    if_scalar: Option<String>,
    tags: Vec<TagRule>,
}

impl Schema {
    pub(crate) fn new(
        id: SchemaId,
        name: String,
        fields: Vec<FieldDescriptor>,
        if_scalar: Option<String>,
        tags: Vec<TagRule>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        Self {
            id,
            name,
            fields,
            index,
            if_scalar,
            tags,
        }
    }

    #[must_use]
    #[inline]
    pub const fn id(&self) -> SchemaId {
        self.id
    }

    /// True if both schemas describe the same configuration type
    #[must_use]
    #[inline]
    pub fn is_same_type(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Type name used in diagnostics and comments
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[must_use]
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Declaration position of a field
    #[must_use]
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The scalar shorthand field, if declared
    #[must_use]
    #[inline]
    pub fn if_scalar(&self) -> Option<&str> {
        self.if_scalar.as_deref()
    }

    /// True if a bare scalar may stand in for a full mapping of this type
    #[must_use]
    #[inline]
    pub const fn supports_scalar(&self) -> bool {
        self.if_scalar.is_some()
    }

    #[must_use]
    #[inline]
    pub fn tags(&self) -> &[TagRule] {
        &self.tags
    }

    /// Find the rule for a tag, with or without a leading `!`
    #[must_use]
    #[inline]
    pub fn tag(&self, tag: &str) -> Option<&TagRule> {
        let tag = tag.trim_start_matches('!');
        self.tags.iter().find(|rule| rule.name == tag)
    }
}
