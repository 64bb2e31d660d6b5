//! Process-wide schema registry
//!
//! Schemas for Rust types are built on first request and memoized by
//! `TypeId` for the lifetime of the process. Builds run outside the lock and
//! the first schema inserted wins, so racing first requests converge on one
//! `Arc<Schema>`. A schema that lost the race may still be held by a parent
//! built concurrently; it carries the same [`SchemaId::Type`] identity.

use crate::error::{ConfError, Result};
use crate::schema::{Schema, SchemaBuilder, SchemaId};
use core::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// A Rust type that declares a configuration schema
///
/// # Example
/// ```
/// use confclass::schema::{Confclass, FieldSpec, SchemaBuilder};
///
/// struct Server;
///
/// impl Confclass for Server {
///     fn describe(schema: SchemaBuilder) -> SchemaBuilder {
///         schema
///             .field(FieldSpec::string("host").default("localhost"))
///             .field(FieldSpec::integer("port").default(8080))
///     }
/// }
///
/// let schema = confclass::build_schema::<Server>().unwrap();
/// assert_eq!(schema.name(), "Server");
/// assert_eq!(schema.fields().len(), 2);
/// ```
pub trait Confclass: 'static {
    /// Declare the fields of this type in order
    fn describe(schema: SchemaBuilder) -> SchemaBuilder;

    /// Name used in diagnostics and documentation comments
    #[must_use]
    #[inline]
    fn type_name() -> &'static str {
        short_type_name(core::any::type_name::<Self>())
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

type Registry = RwLock<HashMap<TypeId, Arc<Schema>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

thread_local! {
    static IN_PROGRESS: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a type as being built on this thread, to reject recursive nesting
struct BuildGuard(TypeId);

impl BuildGuard {
    fn enter(id: TypeId, name: &str) -> Result<Self> {
        IN_PROGRESS.with_borrow_mut(|stack| {
            if stack.contains(&id) {
                return Err(ConfError::setup(format!(
                    "{name} nests itself; recursive confclasses are not supported"
                )));
            }
            stack.push(id);
            Ok(Self(id))
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with_borrow_mut(|stack| stack.retain(|id| *id != self.0));
    }
}

/// Get the memoized schema for `T`, building it on first use
///
/// # Errors
///
/// Returns a setup error if the schema is ill-formed or the registry lock is
/// poisoned.
#[inline]
pub fn build_schema<T: Confclass>() -> Result<Arc<Schema>> {
    let id = TypeId::of::<T>();
    {
        let schemas = registry()
            .read()
            .map_err(|e| ConfError::setup(format!("schema registry poisoned: {e}")))?;
        if let Some(schema) = schemas.get(&id) {
            return Ok(Arc::clone(schema));
        }
    }

    let _guard = BuildGuard::enter(id, T::type_name())?;
    let schema = Arc::new(
        T::describe(SchemaBuilder::new(T::type_name()))
            .with_id(SchemaId::Type(id))
            .build()?,
    );
    debug!(
        "built schema for {} with {} fields",
        schema.name(),
        schema.fields().len()
    );

    let mut schemas = registry()
        .write()
        .map_err(|e| ConfError::setup(format!("schema registry poisoned: {e}")))?;
    Ok(Arc::clone(schemas.entry(id).or_insert(schema)))
}

/// True if the schema for `T` has already been built
#[must_use]
#[inline]
pub fn is_registered<T: Confclass>() -> bool {
    registry()
        .read()
        .is_ok_and(|schemas| schemas.contains_key(&TypeId::of::<T>()))
}
