//! The `hash` command.

use anyhow::Result;
use clap::Args;

use super::Session;

/// Print the configuration hash.
#[derive(Args, Debug)]
pub struct HashCommand {}

impl HashCommand {
    pub fn execute(self, session: &Session) -> Result<()> {
        let config = session.load_config()?;
        println!("{}", config.config_sha256()?);
        Ok(())
    }
}
