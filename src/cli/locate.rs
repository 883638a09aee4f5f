//! `locate` command.

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use crate::locator::executable_state;

/// Print the resolved location and its executable state.
#[derive(Args)]
pub struct LocateCommand {
    /// Print only the path
    #[arg(long)]
    path_only: bool,
}

impl LocateCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let manager = config.build_manager().await?;
        let location = manager.location();

        if self.path_only {
            println!("{}", location.path().display());
            return Ok(());
        }

        println!("Location: {location}");
        println!("State: {}", executable_state(location.path()));
        println!("Resources: {}", manager.locator().resources_dir().display());
        Ok(())
    }
}
