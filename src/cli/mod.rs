//! Command-line interface.
//!
//! ```text
//! bazel-depgen [--config-file PATH] [--tree PATH] [--verbose|--quiet] <COMMAND>
//! ```
//!
//! # Commands
//!
//! - `generate` - write the extension file and, if missing, its `BUILD.bazel`
//! - `print-graph` - print the collected artifact graph
//! - `hash` - print the configuration hash embedded in generated files
//!
//! # Global Options
//!
//! - `--config-file` - configuration file (default `dependencies.yml`)
//! - `--tree` - resolver output (default `resolved-tree.json` next to the
//!   configuration file)
//! - `--verbose` - enable debug output
//! - `--quiet` - only report errors
//!
//! Log output goes to stderr. `RUST_LOG` is honored unless `--verbose` or
//! `--quiet` is given.

mod common;
mod generate;
mod hash;
mod print_graph;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::constants::DEFAULT_CONFIG_FILE;

pub use common::Session;

/// Settings derived from global flags, applied once before a command runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter directive for the log subscriber; `None` defers to `RUST_LOG`
    pub log_level: Option<String>,
    /// Suppress informational output on stdout
    pub quiet: bool,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    ///
    /// A subscriber installed earlier (e.g. by a test) is left in place.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Generate Bazel rules from a resolved Maven dependency tree.
#[derive(Parser, Debug)]
#[command(name = "bazel-depgen", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, env = "BAZEL_DEPGEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Path to the resolved dependency tree
    #[arg(long, global = true)]
    tree: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the extension file and its BUILD.bazel
    Generate(generate::GenerateCommand),

    /// Print the collected artifact graph
    PrintGraph(print_graph::PrintGraphCommand),

    /// Print the configuration hash
    Hash(hash::HashCommand),
}

impl Cli {
    /// Run the selected command.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };
        CliConfig {
            log_level,
            quiet: self.quiet,
        }
    }

    /// Run the selected command with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let session = Session::new(self.config_file, self.tree);

        match self.command {
            Commands::Generate(cmd) => cmd.execute(&session, &config),
            Commands::PrintGraph(cmd) => cmd.execute(&session),
            Commands::Hash(cmd) => cmd.execute(&session),
        }
    }
}
