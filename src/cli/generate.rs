//! The `generate` command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use super::{CliConfig, Session};
use crate::emitter::Generator;

/// Collect the graph and write the generated build files.
#[derive(Args, Debug)]
pub struct GenerateCommand {}

impl GenerateCommand {
    pub fn execute(self, session: &Session, cli: &CliConfig) -> Result<()> {
        let config = session.load_config()?;
        let mut cache = session.metadata_cache()?;
        let graph = session.collect(&config, &mut cache)?;

        let files = Generator::new(&config, &graph)?.generate(&mut cache)?;
        let report = files.write()?;

        if !cli.quiet {
            let workspace = config.workspace_directory();
            for path in &report.written {
                println!("{} {}", "Wrote".green().bold(), relative(path, &workspace));
            }
            for path in &report.untouched {
                println!("{} {}", "Kept".yellow(), relative(path, &workspace));
            }
            println!("Generated rules for {} artifacts", graph.len());
        }
        Ok(())
    }
}

fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
