//! The `print-graph` command.

use anyhow::Result;
use clap::Args;

use super::Session;

/// Print the artifact graph as a tree.
#[derive(Args, Debug)]
pub struct PrintGraphCommand {}

impl PrintGraphCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let config = session.load_config()?;
        let mut cache = session.metadata_cache()?;
        let graph = session.collect(&config, &mut cache)?;

        if graph.is_empty() {
            println!("No dependencies");
        } else {
            print!("{}", graph.to_tree_string());
        }
        Ok(())
    }
}
