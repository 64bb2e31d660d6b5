//! `confclass` - Schema-driven configuration loading
//!
//! A configuration type declares its fields once, through the [`Confclass`]
//! trait or a runtime [`definition`] file. Loading reconciles a YAML
//! document against that schema: defaults fill absent fields, nested types
//! recurse, scalar types are checked exactly and every missing required
//! field is reported in one error. Instances refuse reads until they have
//! been loaded.
//!
//! ```
//! use confclass::{Confclass, FieldSpec, SchemaBuilder};
//!
//! struct Server;
//!
//! impl Confclass for Server {
//!     fn describe(schema: SchemaBuilder) -> SchemaBuilder {
//!         schema
//!             .field(FieldSpec::string("host").default("localhost"))
//!             .field(FieldSpec::integer("port"))
//!     }
//! }
//!
//! let mut server = confclass::construct::<Server>().unwrap();
//! assert!(server.get("port").is_err());
//!
//! confclass::load_str(&mut server, "port: 8080").unwrap();
//! assert_eq!(server.get_int("port").unwrap(), 8080);
//! assert_eq!(server.get_str("host").unwrap(), "localhost");
//! ```

pub mod cli;
pub mod definition;
pub mod document;
pub mod emit;
pub mod error;
pub mod instance;
pub mod materialize;
pub mod schema;
pub mod system;

pub use document::{Mapping, Node};
pub use error::{ConfError, Result};
pub use instance::{Instance, Value};
pub use schema::{Confclass, FieldSpec, ScalarKind, Schema, SchemaBuilder, build_schema};

use cli::Args;
use document::yaml;
use std::io::{self, Read};
use std::path::Path;
use system::System;
use tracing::debug;

/// Create an unloaded instance of `T`
///
/// # Errors
///
/// Returns a setup error if the schema of `T` is ill-formed.
#[inline]
pub fn construct<T: Confclass>() -> Result<Instance> {
    Ok(Instance::new(build_schema::<T>()?))
}

/// Create an unloaded instance of `T` capturing construction arguments
///
/// # Errors
///
/// Returns a setup error if:
/// - The schema of `T` is ill-formed
/// - An argument names an unknown field or has the wrong type
#[inline]
pub fn construct_with<T, I, K, V>(args: I) -> Result<Instance>
where
    T: Confclass,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    Instance::with_args(build_schema::<T>()?, args)
}

/// Materialize `node` into `instance` and mark it loaded
///
/// On failure the instance is left exactly as it was.
///
/// # Errors
///
/// Returns an error if:
/// - The document does not match the schema (loading error)
/// - Required fields are missing (missing value error listing every path)
#[inline]
pub fn load(instance: &mut Instance, node: &Node) -> Result<()> {
    materialize::load(instance, node)
}

/// Parse YAML text and load it into `instance`
///
/// Empty input loads as an empty mapping.
///
/// # Errors
///
/// Returns a loading error if the text is not valid YAML, plus every
/// error [`load`] can return.
#[inline]
pub fn load_str(instance: &mut Instance, text: &str) -> Result<()> {
    let node = yaml::parse_str(text)?;
    load(instance, &node)
}

/// Read YAML from `reader` and load it into `instance`
///
/// # Errors
///
/// Returns a filesystem error if reading fails, plus every error
/// [`load_str`] can return.
#[inline]
pub fn load_reader<R: Read>(instance: &mut Instance, mut reader: R) -> Result<()> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| ConfError::filesystem(format!("Failed to read config: {e}")))?;
    load_str(instance, &text)
}

/// Read a YAML file through `system` and load it into `instance`
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist (loading error naming the file)
/// - The file cannot be read (filesystem error)
/// - The content fails to load (see [`load_str`])
#[inline]
pub fn load_file(system: &dyn System, instance: &mut Instance, path: &Path) -> Result<()> {
    let text = system.read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ConfError::loading(
                path.display().to_string(),
                "config file not found".to_owned(),
            )
        } else {
            ConfError::filesystem(format!("Failed to read {}: {e}", path.display()))
        }
    })?;
    debug!("Loading {} from {}", instance.type_name(), path.display());
    load_str(instance, &text)
}

/// Emit a loaded instance as a document node
///
/// With `documentation` set, every key carries a comment block with the
/// field's type label and documentation text.
///
/// # Errors
///
/// Returns an attribute error if the instance, or a nested instance, has
/// not been loaded.
#[inline]
pub fn save(instance: &Instance, documentation: bool) -> Result<Node> {
    emit::save(instance, documentation)
}

/// Emit a loaded instance as YAML text
///
/// # Errors
///
/// Returns the same errors as [`save`].
#[inline]
pub fn save_to_string(instance: &Instance, documentation: bool) -> Result<String> {
    Ok(yaml::render(&save(instance, documentation)?))
}

/// Emit a loaded instance as YAML and write it through `system`
///
/// # Errors
///
/// Returns an error if:
/// - The instance is not loaded
/// - The file cannot be written (filesystem error)
#[inline]
pub fn save_file(
    system: &dyn System,
    instance: &Instance,
    path: &Path,
    documentation: bool,
) -> Result<()> {
    let text = save_to_string(instance, documentation)?;
    system
        .write(path, text.as_bytes())
        .map_err(|e| ConfError::filesystem(format!("Failed to write {}: {e}", path.display())))
}

/// New loaded instance with the named fields replaced
///
/// # Errors
///
/// Returns a setup error if `value` is not a configuration instance or a
/// change names an unknown field, and a loading error if a replacement has
/// the wrong type.
#[inline]
pub fn replace<I, K, V>(value: &Value, changes: I) -> Result<Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    instance::replace(value, changes)
}

/// Whether `value` holds a configuration instance
///
/// Types are checked at compile time through the [`Confclass`] bound; a
/// declared field's type is checked with [`schema::FieldType::is_confclass`].
#[must_use]
#[inline]
pub const fn is_confclass(value: &Value) -> bool {
    value.is_confclass()
}

/// Main entry point of the command-line front end
///
/// # Errors
///
/// Returns an error if the schema definition or config fails to load, or
/// the output cannot be written.
#[inline]
pub fn run(args: &Args, system: &dyn System) -> anyhow::Result<()> {
    if let Some(rendered) = cli::execute(args, system)? {
        // Output to stdout (not using logging)
        print!("{rendered}");
    }
    Ok(())
}
