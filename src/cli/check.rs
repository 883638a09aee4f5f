//! `check` command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use crate::update::UpdateDecision;

/// Print the update decision without installing anything.
#[derive(Args)]
pub struct CheckCommand {}

impl CheckCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let manager = config.build_manager().await?;
        let decision = manager.check().await;

        let label = match decision {
            UpdateDecision::UpToDate => decision.to_string().green(),
            UpdateDecision::NeedsInstall | UpdateDecision::NeedsUpdate => decision.to_string().yellow(),
        };
        println!("stattrack: {label}");
        println!("Location: {}", manager.location());
        Ok(())
    }
}
