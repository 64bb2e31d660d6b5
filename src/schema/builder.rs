//! Declarative schema construction
//!
//! Field specs are collected in declaration order and resolved in one pass by
//! [`SchemaBuilder::build`], which also enforces every setup rule.

use crate::error::{ConfError, Result};
use crate::instance::{Instance, Value};
use crate::materialize::checks;
use crate::schema::registry::{Confclass, build_schema};
use crate::schema::{
    DefaultFactory, DefaultSource, ElementType, FieldDescriptor, FieldType, ScalarKind, Schema,
    SchemaId, TagRule,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DECLARED_ID: AtomicU64 = AtomicU64::new(0);

type SchemaFn = fn() -> Result<Arc<Schema>>;

/// A nested schema that is either registered for a Rust type or already built
#[derive(Clone)]
enum SchemaSource {
    Registered(SchemaFn),
    Built(Arc<Schema>),
}

impl SchemaSource {
    fn resolve(&self) -> Result<Arc<Schema>> {
        match *self {
            Self::Registered(build) => build(),
            Self::Built(ref schema) => Ok(Arc::clone(schema)),
        }
    }
}

enum ElementDecl {
    Any,
    Scalar(ScalarKind),
    Nested(SchemaSource),
}

enum TypeDecl {
    Scalar(ScalarKind),
    Nested(SchemaSource),
    List(ElementDecl),
    Map,
}

impl TypeDecl {
    fn resolve(&self) -> Result<FieldType> {
        Ok(match *self {
            Self::Scalar(kind) => FieldType::Scalar(kind),
            Self::Nested(ref source) => FieldType::Nested(source.resolve()?),
            Self::List(ElementDecl::Any) => FieldType::List(ElementType::Any),
            Self::List(ElementDecl::Scalar(kind)) => FieldType::List(ElementType::Scalar(kind)),
            Self::List(ElementDecl::Nested(ref source)) => {
                FieldType::List(ElementType::Nested(source.resolve()?))
            }
            Self::Map => FieldType::Map,
        })
    }
}

enum DefaultDecl {
    Value(Value),
    Factory(DefaultFactory),
    Prototype {
        source: SchemaSource,
        args: Vec<(String, Value)>,
    },
}

/// Declaration of one field
pub struct FieldSpec {
    name: String,
    ty: TypeDecl,
    default: Option<DefaultDecl>,
    doc: Option<String>,
}

impl FieldSpec {
    fn with_type<N: Into<String>>(name: N, ty: TypeDecl) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            doc: None,
        }
    }

    /// A scalar field of the given kind
    #[must_use]
    #[inline]
    pub fn scalar<N: Into<String>>(name: N, kind: ScalarKind) -> Self {
        Self::with_type(name, TypeDecl::Scalar(kind))
    }

    #[must_use]
    #[inline]
    pub fn string<N: Into<String>>(name: N) -> Self {
        Self::scalar(name, ScalarKind::String)
    }

    #[must_use]
    #[inline]
    pub fn integer<N: Into<String>>(name: N) -> Self {
        Self::scalar(name, ScalarKind::Integer)
    }

    #[must_use]
    #[inline]
    pub fn float<N: Into<String>>(name: N) -> Self {
        Self::scalar(name, ScalarKind::Float)
    }

    #[must_use]
    #[inline]
    pub fn bool<N: Into<String>>(name: N) -> Self {
        Self::scalar(name, ScalarKind::Bool)
    }

    /// A nested configuration field of type `T`
    ///
    /// Without an explicit default, a fresh `T` is constructed per instance.
    #[must_use]
    #[inline]
    pub fn nested<T: Confclass, N: Into<String>>(name: N) -> Self {
        Self::with_type(
            name,
            TypeDecl::Nested(SchemaSource::Registered(build_schema::<T>)),
        )
    }

    /// A nested configuration field of type `T` whose default is a `T`
    /// constructed with captured arguments
    #[must_use]
    #[inline]
    pub fn nested_default<T, N, I, K, V>(name: N, args: I) -> Self
    where
        T: Confclass,
        N: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::nested::<T, N>(name).default_instance::<T, I, K, V>(args)
    }

    /// A nested configuration field with an already built schema
    #[must_use]
    #[inline]
    pub fn nested_schema<N: Into<String>>(name: N, schema: Arc<Schema>) -> Self {
        Self::with_type(name, TypeDecl::Nested(SchemaSource::Built(schema)))
    }

    /// A list whose elements must all be of the given scalar kind
    #[must_use]
    #[inline]
    pub fn list<N: Into<String>>(name: N, kind: ScalarKind) -> Self {
        Self::with_type(name, TypeDecl::List(ElementDecl::Scalar(kind)))
    }

    /// A list of configuration objects of type `T`
    #[must_use]
    #[inline]
    pub fn list_of<T: Confclass, N: Into<String>>(name: N) -> Self {
        Self::with_type(
            name,
            TypeDecl::List(ElementDecl::Nested(SchemaSource::Registered(
                build_schema::<T>,
            ))),
        )
    }

    /// A list of configuration objects with an already built schema
    #[must_use]
    #[inline]
    pub fn list_of_schema<N: Into<String>>(name: N, schema: Arc<Schema>) -> Self {
        Self::with_type(
            name,
            TypeDecl::List(ElementDecl::Nested(SchemaSource::Built(schema))),
        )
    }

    /// An untyped list
    #[must_use]
    #[inline]
    pub fn any_list<N: Into<String>>(name: N) -> Self {
        Self::with_type(name, TypeDecl::List(ElementDecl::Any))
    }

    /// An untyped mapping
    #[must_use]
    #[inline]
    pub fn mapping<N: Into<String>>(name: N) -> Self {
        Self::with_type(name, TypeDecl::Map)
    }

    /// Default value; lists, mappings and instances are copied per instance
    #[must_use]
    #[inline]
    pub fn default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(DefaultDecl::Value(value.into()));
        self
    }

    /// Default produced by calling `factory` for every new instance
    #[must_use]
    #[inline]
    pub fn default_with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultDecl::Factory(Arc::new(factory)));
        self
    }

    /// Default nested instance of `T` constructed with captured arguments
    #[must_use]
    #[inline]
    pub fn default_instance<T, I, K, V>(self, args: I) -> Self
    where
        T: Confclass,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.prototype(SchemaSource::Registered(build_schema::<T>), args)
    }

    /// Default nested instance of an already built schema
    #[must_use]
    #[inline]
    pub fn default_prototype<I, K, V>(self, schema: Arc<Schema>, args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.prototype(SchemaSource::Built(schema), args)
    }

    fn prototype<I, K, V>(mut self, source: SchemaSource, args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let args = args
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.default = Some(DefaultDecl::Prototype { source, args });
        self
    }

    /// Documentation text rendered in commented output
    #[must_use]
    #[inline]
    pub fn doc<D: Into<String>>(mut self, doc: D) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// Builder for a [`Schema`]
pub struct SchemaBuilder {
    id: SchemaId,
    name: String,
    fields: Vec<FieldSpec>,
    if_scalar: Option<String>,
    tags: Vec<TagRule>,
}

impl SchemaBuilder {
    #[must_use]
    #[inline]
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: SchemaId::Declared(NEXT_DECLARED_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            fields: Vec::new(),
            if_scalar: None,
            tags: Vec::new(),
        }
    }

    /// Build the schema under a fixed identity instead of a fresh one
    pub(crate) fn with_id(mut self, id: SchemaId) -> Self {
        self.id = id;
        self
    }

    /// Declare the next field
    #[must_use]
    #[inline]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Allow a bare scalar in place of a mapping; it fills this field and
    /// every other field takes its default
    #[must_use]
    #[inline]
    pub fn if_scalar<N: Into<String>>(mut self, field: N) -> Self {
        self.if_scalar = Some(field.into());
        self
    }

    /// Map a scalar tag to a field assignment during shorthand loading
    ///
    /// A flag tag sets its target to `true`; any other tag stores its own
    /// name in the target. The target defaults to the tag name.
    #[must_use]
    #[inline]
    pub fn tag<N: Into<String>>(mut self, name: N, target: Option<&str>, flag: bool) -> Self {
        self.tags.push(TagRule {
            name: name.into(),
            target: target.map(str::to_owned),
            flag,
        });
        self
    }

    /// Resolve nested schemas and defaults and check the setup rules
    ///
    /// # Errors
    ///
    /// Returns a setup error if:
    /// - Two fields share a name
    /// - A nested schema cannot be built
    /// - A default does not match its field's type
    /// - The scalar shorthand field is missing or not a scalar, the type also
    ///   declares a nested field, or another field has no default
    /// - A tag targets a missing field or a field of the wrong type
    #[inline]
    pub fn build(self) -> Result<Schema> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for spec in self.fields {
            if !seen.insert(spec.name.clone()) {
                return Err(ConfError::setup(format!(
                    "duplicate field '{}' in {}",
                    spec.name, self.name
                )));
            }

            let ty = spec.ty.resolve()?;
            let default = match spec.default {
                Some(decl) => Some(resolve_default(&self.name, &spec.name, &ty, decl)?),
                None => nested_factory(&ty),
            };
            fields.push(FieldDescriptor::new(spec.name, ty, default, spec.doc));
        }

        if let Some(shorthand) = self.if_scalar.as_deref() {
            check_shorthand(&self.name, shorthand, &fields)?;
        }
        check_tags(&self.name, self.if_scalar.is_some(), &self.tags, &fields)?;

        Ok(Schema::new(
            self.id,
            self.name,
            fields,
            self.if_scalar,
            self.tags,
        ))
    }
}

/// Nested fields without a default get a fresh instance per parent
fn nested_factory(ty: &FieldType) -> Option<DefaultSource> {
    let FieldType::Nested(ref nested) = *ty else {
        return None;
    };
    let nested = Arc::clone(nested);
    Some(DefaultSource::Factory(Arc::new(move || {
        Value::Object(Instance::new(Arc::clone(&nested)))
    })))
}

fn copying_factory(value: Value) -> DefaultSource {
    DefaultSource::Factory(Arc::new(move || value.clone()))
}

fn resolve_default(
    type_name: &str,
    field: &str,
    ty: &FieldType,
    decl: DefaultDecl,
) -> Result<DefaultSource> {
    let mismatch = |value: &Value| {
        ConfError::setup(format!(
            "default for {type_name}.{field} must be {}, got {}",
            ty.label(),
            checks::describe(value)
        ))
    };

    match decl {
        DefaultDecl::Factory(factory) => Ok(DefaultSource::Factory(factory)),
        DefaultDecl::Value(value) => {
            if !checks::default_matches(ty, &value) {
                return Err(mismatch(&value));
            }
            Ok(match value {
                Value::Object(instance) => copying_factory(Value::Object(instance.as_prototype())),
                value @ (Value::List(_) | Value::Map(_)) => copying_factory(value),
                scalar => DefaultSource::Value(scalar),
            })
        }
        DefaultDecl::Prototype { source, args } => {
            let prototype = Value::Object(Instance::with_args(source.resolve()?, args)?);
            if !checks::default_matches(ty, &prototype) {
                return Err(mismatch(&prototype));
            }
            Ok(copying_factory(prototype))
        }
    }
}

fn check_shorthand(type_name: &str, shorthand: &str, fields: &[FieldDescriptor]) -> Result<()> {
    let Some(field) = fields.iter().find(|field| field.name() == shorthand) else {
        return Err(ConfError::setup(format!(
            "if_scalar field {shorthand} not found in {type_name}"
        )));
    };
    if fields.iter().any(|field| field.ty().is_confclass()) {
        return Err(ConfError::setup(format!(
            "if_scalar is set, cannot contain a nested confclass in {type_name}"
        )));
    }
    if fields
        .iter()
        .any(|field| field.name() != shorthand && field.is_required())
    {
        return Err(ConfError::setup(format!(
            "if_scalar is set, all other fields must have defaults in {type_name}"
        )));
    }
    if !matches!(*field.ty(), FieldType::Scalar(_)) {
        return Err(ConfError::setup(format!(
            "if_scalar field {shorthand} in {type_name} must be a scalar, not {}",
            field.ty().label()
        )));
    }
    Ok(())
}

fn check_tags(
    type_name: &str,
    has_shorthand: bool,
    tags: &[TagRule],
    fields: &[FieldDescriptor],
) -> Result<()> {
    if !tags.is_empty() && !has_shorthand {
        return Err(ConfError::setup(format!(
            "tags are only applied through if_scalar, which is not set in {type_name}"
        )));
    }

    for rule in tags {
        let target = rule.target_field();
        let Some(field) = fields.iter().find(|field| field.name() == target) else {
            return Err(ConfError::setup(format!(
                "tag !{} targets unknown field {target} in {type_name}",
                rule.name
            )));
        };
        let expected = if rule.flag {
            ScalarKind::Bool
        } else {
            ScalarKind::String
        };
        if !matches!(*field.ty(), FieldType::Scalar(kind) if kind == expected) {
            return Err(ConfError::setup(format!(
                "tag !{} needs {type_name}.{target} to be {}, not {}",
                rule.name,
                expected.label(),
                field.ty().label()
            )));
        }
    }
    Ok(())
}
