use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for confclass
#[derive(Parser, Debug, Clone)]
#[command(name = "confclass")]
#[command(about = "Load a YAML config file against a declared schema and print it back")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Schema definition file declaring the config types
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Configuration file path
    #[arg(long, value_name = "PATH", default_value = "./config.yaml")]
    pub config: PathBuf,

    /// Load the config as this declared type instead of the root type
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: Option<String>,

    /// Include field documentation comments in the output
    #[arg(long)]
    pub comments: bool,

    /// Only validate the config, print nothing on success
    #[arg(long, conflicts_with = "output")]
    pub check: bool,

    /// Write the materialized config to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Arguments for loading `config` against the definition at `schema`
    #[must_use]
    #[inline]
    pub fn new<S: Into<PathBuf>, C: Into<PathBuf>>(schema: S, config: C) -> Self {
        Self {
            schema: schema.into(),
            config: config.into(),
            type_name: None,
            comments: false,
            check: false,
            output: None,
            verbose: false,
        }
    }
}
