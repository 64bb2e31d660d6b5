//! Error taxonomy for schema setup, loading and guarded access

use thiserror::Error;

/// Main error type for confclass operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfError {
    /// Setup Error - the schema itself is ill-formed, or `replace` was misused
    #[error("Setup error: {message}")]
    Setup { message: String },

    /// Loading Error - the document does not match the schema
    #[error("Loading error at {path}: {message}")]
    Loading { path: String, message: String },

    /// Missing Value Error - required fields had neither a value nor a default
    #[error("Missing required config field(s): {}", .paths.join(", "))]
    MissingValue { paths: Vec<String> },

    /// Attribute Error - a field was read before the instance was loaded,
    /// or does not exist, or holds a different kind of value
    #[error("Attribute error on {type_name}.{field}: {message}")]
    Attribute {
        type_name: String,
        field: String,
        message: String,
    },

    /// Filesystem Error - reading or writing a config file failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },
}

impl ConfError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Setup { .. } => 1,
            Self::Loading { .. } => 2,
            Self::MissingValue { .. } => 3,
            Self::Attribute { .. } => 4,
            Self::Filesystem { .. } => 5,
        }
    }

    /// True for loading failures, including missing values
    #[must_use]
    #[inline]
    pub const fn is_loading(&self) -> bool {
        matches!(*self, Self::Loading { .. } | Self::MissingValue { .. })
    }

    /// Dotted location of a loading failure, if any
    #[must_use]
    #[inline]
    pub fn path(&self) -> Option<&str> {
        match *self {
            Self::Loading { ref path, .. } => Some(path),
            Self::MissingValue { ref paths } => paths.first().map(String::as_str),
            Self::Setup { .. } | Self::Attribute { .. } | Self::Filesystem { .. } => None,
        }
    }

    /// Create a setup error
    #[inline]
    pub fn setup<S: Into<String>>(message: S) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Create a loading error at a dotted path
    #[inline]
    pub fn loading<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Loading {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing value error from every missing path found
    #[inline]
    pub const fn missing(paths: Vec<String>) -> Self {
        Self::MissingValue { paths }
    }

    /// Create a premature access error
    #[inline]
    pub fn premature<T: Into<String>, F: Into<String>>(type_name: T, field: F) -> Self {
        Self::attribute(type_name, field, "accessing config before loaded")
    }

    /// Create an attribute error with a custom message
    #[inline]
    pub fn attribute<T: Into<String>, F: Into<String>, S: Into<String>>(
        type_name: T,
        field: F,
        message: S,
    ) -> Self {
        Self::Attribute {
            type_name: type_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the message of a setup error, leaving other kinds untouched
    #[must_use]
    #[inline]
    pub fn in_context<S: AsRef<str>>(self, context: S) -> Self {
        match self {
            Self::Setup { message } => Self::Setup {
                message: format!("{}: {message}", context.as_ref()),
            },
            other => other,
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T, E = ConfError> = core::result::Result<T, E>;
