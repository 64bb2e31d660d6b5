//! Document node model
//!
//! The untyped tree exchanged with the YAML boundary: mappings, sequences and
//! scalars, where a scalar may carry a tag and a mapping key may carry a comment
//! block when the tree was produced by the emitter.

pub mod yaml;

use core::fmt;

/// A generic document node
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A scalar carrying a tag such as `!secure`
    Tagged { tag: String, value: Box<Node> },
    Seq(Vec<Node>),
    Map(Mapping),
}

impl Node {
    /// An empty mapping node
    #[must_use]
    #[inline]
    pub const fn empty_map() -> Self {
        Self::Map(Mapping::new())
    }

    /// Human-readable shape name used in diagnostics
    #[must_use]
    #[inline]
    pub const fn kind_name(&self) -> &'static str {
        match *self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Tagged { .. } => "tagged scalar",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    /// True for strings, numbers, booleans and tagged scalars
    #[must_use]
    #[inline]
    pub fn is_scalar(&self) -> bool {
        match *self {
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_) => true,
            Self::Tagged { ref value, .. } => value.is_scalar(),
            Self::Null | Self::Seq(_) | Self::Map(_) => false,
        }
    }

    /// The node with any tags removed
    #[must_use]
    #[inline]
    pub fn untagged(&self) -> &Self {
        match *self {
            Self::Tagged { ref value, .. } => value.untagged(),
            _ => self,
        }
    }

    /// Split a node into its bare value and outermost tag (without the `!`)
    #[must_use]
    #[inline]
    pub fn split_tag(&self) -> (&Self, Option<&str>) {
        match *self {
            Self::Tagged { ref tag, ref value } => {
                (value.untagged(), Some(tag.trim_start_matches('!')))
            }
            _ => (self, None),
        }
    }

    /// Borrow the mapping, if this node (ignoring tags) is one
    #[must_use]
    #[inline]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match *self.untagged() {
            Self::Map(ref map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the sequence items, if this node (ignoring tags) is one
    #[must_use]
    #[inline]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match *self.untagged() {
            Self::Seq(ref items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Node {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Node {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Node {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Node {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Mapping> for Node {
    #[inline]
    fn from(value: Mapping) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Node {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Self::Seq(value.into_iter().map(Into::into).collect())
    }
}

/// Compact flow-style rendering, used in log lines
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(ref s) => write!(f, "{s:?}"),
            Self::Tagged { ref tag, ref value } => {
                write!(f, "!{} {value}", tag.trim_start_matches('!'))
            }
            Self::Seq(ref items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(ref map) => {
                f.write_str("{")?;
                for (i, entry) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", entry.key, entry.value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// One key of a mapping, with an optional comment block rendered before it
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: Node,
    pub comment: Option<String>,
}

/// Insertion-ordered mapping with string keys
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<MapEntry>,
}

impl Mapping {
    /// Create an empty mapping
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of keys
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the mapping has no keys
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key
    #[must_use]
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// True if the key is present
    #[must_use]
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Insert a value, replacing (in place) any existing value for the key
    #[inline]
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Node) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.value = value;
        } else {
            self.entries.push(MapEntry {
                key,
                value,
                comment: None,
            });
        }
    }

    /// Insert a value with a comment block attached to its key
    #[inline]
    pub fn insert_commented<K: Into<String>>(&mut self, key: K, value: Node, comment: String) {
        let key = key.into();
        self.insert(key.clone(), value);
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.comment = Some(comment);
        }
    }

    /// Comment block attached to a key, if any
    #[must_use]
    #[inline]
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.comment.as_deref())
    }

    /// Iterate entries in insertion order
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, MapEntry> {
        self.entries.iter()
    }

    /// Iterate keys in insertion order
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = &'a MapEntry;
    type IntoIter = core::slice::Iter<'a, MapEntry>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
