//! Runtime values held by configuration instances

use crate::document::Node;
use crate::instance::Instance;

/// A materialized field value
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Untyped mapping in document order
    Map(Vec<(String, Value)>),
    /// A nested configuration instance
    Object(Instance),
}

impl Value {
    /// Convert untyped document content, dropping tags
    #[must_use]
    #[inline]
    pub fn from_node(node: &Node) -> Self {
        match *node.untagged() {
            Node::Bool(b) => Self::Bool(b),
            Node::Int(i) => Self::Int(i),
            Node::Float(f) => Self::Float(f),
            Node::Str(ref s) => Self::Str(s.clone()),
            Node::Seq(ref items) => Self::List(items.iter().map(Self::from_node).collect()),
            Node::Map(ref map) => Self::Map(
                map.iter()
                    .map(|entry| (entry.key.clone(), Self::from_node(&entry.value)))
                    .collect(),
            ),
            Node::Null | Node::Tagged { .. } => Self::Null,
        }
    }

    /// Shape name used in diagnostics
    #[must_use]
    #[inline]
    pub const fn kind_name(&self) -> &'static str {
        match *self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
            Self::Object(_) => "confclass",
        }
    }

    /// True if the value is a configuration instance
    #[must_use]
    #[inline]
    pub const fn is_confclass(&self) -> bool {
        matches!(*self, Self::Object(_))
    }

    /// True for strings, numbers and booleans
    #[must_use]
    #[inline]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            *self,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_)
        )
    }

    #[must_use]
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Self::Str(ref s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Float(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub fn as_list(&self) -> Option<&[Self]> {
        match *self {
            Self::List(ref items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Self>> {
        match *self {
            Self::List(ref mut items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key of an untyped mapping
    #[must_use]
    #[inline]
    pub fn get_key(&self, key: &str) -> Option<&Self> {
        match *self {
            Self::Map(ref entries) => entries
                .iter()
                .find(|&&(ref k, _)| k == key)
                .map(|&(_, ref v)| v),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub const fn as_object(&self) -> Option<&Instance> {
        match *self {
            Self::Object(ref instance) => Some(instance),
            _ => None,
        }
    }

    #[must_use]
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut Instance> {
        match *self {
            Self::Object(ref mut instance) => Some(instance),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Instance> for Value {
    #[inline]
    fn from(value: Instance) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, T: Into<Self>> FromIterator<(K, T)> for Value {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
