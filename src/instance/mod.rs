//! Guarded configuration instances
//!
//! An [`Instance`] is created unloaded, optionally capturing construction
//! arguments, and becomes readable only once it has been loaded. The loaded
//! flag is a one-way switch: nothing in the crate ever clears it.

pub mod value;

pub use value::Value;

use crate::emit;
use crate::error::{ConfError, Result};
use crate::materialize::checks;
use crate::schema::{FieldDescriptor, Schema};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A configuration object guarded against reads before it is loaded
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    captured: Vec<(String, Value)>,
    values: Vec<Value>,
    loaded: bool,
}

impl Instance {
    /// Create an unloaded instance with no captured arguments
    #[must_use]
    #[inline]
    pub const fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            captured: Vec::new(),
            values: Vec::new(),
            loaded: false,
        }
    }

    /// Create an unloaded instance capturing construction arguments
    ///
    /// Captured arguments take precedence over schema defaults and are
    /// overridden by values present in the loaded document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An argument names a field the schema does not declare
    /// - An argument value does not match the field's declared type
    #[inline]
    pub fn with_args<I, K, V>(schema: Arc<Schema>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut captured: Vec<(String, Value)> = Vec::new();
        for (key, value) in args {
            let key = key.into();
            let value = value.into();
            let Some(field) = schema.field(&key) else {
                return Err(ConfError::setup(format!(
                    "{} has no field '{key}'",
                    schema.name()
                )));
            };
            if !checks::default_matches(field.ty(), &value) {
                return Err(ConfError::setup(format!(
                    "argument '{key}' of {} expects {}, got {}",
                    schema.name(),
                    field.ty().label(),
                    checks::describe(&value)
                )));
            }
            captured.retain(|&(ref k, _)| *k != key);
            captured.push((key, value));
        }

        Ok(Self {
            schema,
            captured,
            values: Vec::new(),
            loaded: false,
        })
    }

    /// An unloaded copy that reproduces this instance when loaded from an
    /// empty document
    ///
    /// Loaded instances turn their current values into captured arguments.
    #[must_use]
    #[inline]
    pub fn as_prototype(&self) -> Self {
        if !self.loaded {
            return self.clone();
        }
        Self {
            schema: Arc::clone(&self.schema),
            captured: self
                .schema
                .fields()
                .iter()
                .zip(&self.values)
                .map(|(field, value)| (field.name().to_owned(), value.clone()))
                .collect(),
            values: Vec::new(),
            loaded: false,
        }
    }

    /// Phase two of construction: install the resolved field values and
    /// mark the instance loaded
    pub(crate) fn seal(&mut self, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.schema.fields().len());
        self.values = values;
        self.loaded = true;
    }

    #[must_use]
    #[inline]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    #[inline]
    pub const fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Arguments captured at construction
    #[must_use]
    #[inline]
    pub fn captured(&self) -> &[(String, Value)] {
        &self.captured
    }

    /// Captured argument for a field, if any
    #[must_use]
    #[inline]
    pub fn captured_arg(&self, name: &str) -> Option<&Value> {
        self.captured
            .iter()
            .find(|&&(ref k, _)| k == name)
            .map(|&(_, ref v)| v)
    }

    fn slot(&self, name: &str) -> Result<usize> {
        if !self.loaded {
            return Err(ConfError::premature(self.schema.name(), name));
        }
        self.schema
            .index_of(name)
            .ok_or_else(|| ConfError::attribute(self.schema.name(), name, "no such field"))
    }

    fn wrong_kind(&self, name: &str, expected: &str, value: &Value) -> ConfError {
        ConfError::attribute(
            self.schema.name(),
            name,
            format!("expected {expected}, holds {}", value.kind_name()),
        )
    }

    /// Read a field
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The instance has not been loaded yet
    /// - The schema has no such field
    #[inline]
    pub fn get(&self, name: &str) -> Result<&Value> {
        let slot = self.slot(name)?;
        Ok(&self.values[slot])
    }

    /// Mutably borrow a field
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The instance has not been loaded yet
    /// - The schema has no such field
    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        let slot = self.slot(name)?;
        Ok(&mut self.values[slot])
    }

    /// Read a string field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not a string.
    #[inline]
    pub fn get_str(&self, name: &str) -> Result<&str> {
        let value = self.get(name)?;
        value
            .as_str()
            .ok_or_else(|| self.wrong_kind(name, "string", value))
    }

    /// Read an integer field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not an integer.
    #[inline]
    pub fn get_int(&self, name: &str) -> Result<i64> {
        let value = self.get(name)?;
        value
            .as_int()
            .ok_or_else(|| self.wrong_kind(name, "integer", value))
    }

    /// Read a float field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not a float.
    #[inline]
    pub fn get_float(&self, name: &str) -> Result<f64> {
        let value = self.get(name)?;
        value
            .as_float()
            .ok_or_else(|| self.wrong_kind(name, "float", value))
    }

    /// Read a boolean field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not a bool.
    #[inline]
    pub fn get_bool(&self, name: &str) -> Result<bool> {
        let value = self.get(name)?;
        value
            .as_bool()
            .ok_or_else(|| self.wrong_kind(name, "bool", value))
    }

    /// Read a list field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not a list.
    #[inline]
    pub fn get_list(&self, name: &str) -> Result<&[Value]> {
        let value = self.get(name)?;
        value
            .as_list()
            .ok_or_else(|| self.wrong_kind(name, "list", value))
    }

    /// Mutably borrow a list field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not a list.
    #[inline]
    pub fn get_list_mut(&mut self, name: &str) -> Result<&mut Vec<Value>> {
        let slot = self.slot(name)?;
        let type_name = self.schema.name().to_owned();
        match self.values[slot] {
            Value::List(ref mut items) => Ok(items),
            ref other => Err(ConfError::attribute(
                type_name,
                name,
                format!("expected list, holds {}", other.kind_name()),
            )),
        }
    }

    /// Read a nested configuration field
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read or is not a confclass.
    #[inline]
    pub fn get_nested(&self, name: &str) -> Result<&Self> {
        let value = self.get(name)?;
        value
            .as_object()
            .ok_or_else(|| self.wrong_kind(name, "confclass", value))
    }

    /// Iterate fields with their values in declaration order
    ///
    /// # Errors
    ///
    /// Returns an error if the instance has not been loaded yet.
    #[inline]
    pub fn iter(&self) -> Result<impl Iterator<Item = (&FieldDescriptor, &Value)>> {
        if !self.loaded {
            let first = self
                .schema
                .fields()
                .first()
                .map_or("<fields>", FieldDescriptor::name);
            return Err(ConfError::premature(self.schema.name(), first));
        }
        Ok(self.schema.fields().iter().zip(&self.values))
    }

    /// Produce a new loaded instance with some fields overridden
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - This instance has not been loaded yet
    /// - A change names a field the schema does not declare
    /// - A change does not match the field's declared type
    #[inline]
    pub fn replace<I, K, V>(&self, changes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut values = Vec::with_capacity(self.values.len());
        for field in self.schema.fields() {
            values.push(self.get(field.name())?.clone());
        }

        for (key, value) in changes {
            let key = key.into();
            let value = value.into();
            let Some(slot) = self.schema.index_of(&key) else {
                return Err(ConfError::setup(format!(
                    "replace: {} has no field '{key}'",
                    self.schema.name()
                )));
            };
            let field = &self.schema.fields()[slot];
            checks::replacement(field, &value, &format!("root.{key}"))?;
            values[slot] = value;
        }

        let mut replaced = Self {
            schema: Arc::clone(&self.schema),
            captured: self.captured.clone(),
            values: Vec::new(),
            loaded: false,
        };
        replaced.seal(values);
        Ok(replaced)
    }

    /// Convert a loaded instance into a plain serde type
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The instance (or a nested one) has not been loaded yet
    /// - The target type does not accept the emitted document
    #[inline]
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        let node = emit::save(self, false)?;
        let value = crate::document::yaml::to_yaml_value(&node);
        serde_yaml::from_value(value).map_err(|e| {
            ConfError::loading(
                "root",
                format!("cannot extract {}: {e}", self.schema.name()),
            )
        })
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.is_same_type(&other.schema)
            && self.loaded == other.loaded
            && self.values == other.values
            && (self.loaded || self.captured == other.captured)
    }
}

/// `replace` for any value: only configuration instances can be replaced
///
/// # Errors
///
/// Returns an error if:
/// - The value is not a configuration instance
/// - [`Instance::replace`] fails
#[inline]
pub fn replace<I, K, V>(value: &Value, changes: I) -> Result<Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    match *value {
        Value::Object(ref instance) => instance.replace(changes).map(Value::Object),
        ref other => Err(ConfError::setup(format!(
            "replace can only be used on confclasses, not {}",
            other.kind_name()
        ))),
    }
}
