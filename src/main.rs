//! # `confclass`
//!
//! Loads a YAML config file against the types declared in a schema
//! definition file, then prints the materialized config with every default
//! filled in.
//!
//! ## Usage
//!
//! ```sh
//! confclass --schema schema.yaml --config config.yaml --comments
//! confclass --schema schema.yaml --check
//! ```
//!
//! Exit codes: 0 success, 1 schema setup error, 2 loading error, 3 missing
//! values, 4 premature access, 5 filesystem error.

use clap::Parser as _;
use confclass::cli::Args;
use confclass::error::ConfError;
use confclass::system::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    match confclass::run(&args, &system) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(
                err.downcast_ref::<ConfError>()
                    .map_or(1, ConfError::exit_code),
            );
        }
    }
}
