//! CLI command implementations

use crate::cli::Args;
use crate::definition::SchemaSet;
use crate::system::System;
use anyhow::{Context as _, Result};
use tracing::{debug, info};

/// Load the config named by `args` and render it
///
/// Returns the rendered document when it should be printed, or `None` when
/// only a check was requested or the output went to a file.
///
/// # Errors
///
/// Returns an error if:
/// - The schema definition cannot be read or compiled
/// - The config file cannot be read or does not match the schema
/// - The output file cannot be written
#[inline]
pub fn execute(args: &Args, system: &dyn System) -> Result<Option<String>> {
    let schemas = SchemaSet::from_file(system, &args.schema).with_context(|| {
        format!("Failed to load schema definition {}", args.schema.display())
    })?;
    debug!("Available types: {}", schemas.names().join(", "));

    let mut config = schemas.construct(args.type_name.as_deref())?;
    crate::load_file(system, &mut config, &args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    if args.check {
        info!(
            "{} is a valid {}",
            args.config.display(),
            config.type_name()
        );
        return Ok(None);
    }

    if let Some(output) = args.output.as_deref() {
        crate::save_file(system, &config, output, args.comments)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Wrote {}", output.display());
        return Ok(None);
    }

    Ok(Some(crate::save_to_string(&config, args.comments)?))
}
