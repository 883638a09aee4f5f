//! `install` command.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use crate::manager::InstallOutcome;

/// Run one check-and-install cycle.
///
/// Succeeds when a runnable binary is in place afterwards, even if an update
/// attempt failed and the previous binary was kept.
#[derive(Args)]
pub struct InstallCommand {
    /// Reinstall even if the installed binary is current
    #[arg(long)]
    force: bool,
}

impl InstallCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let manager = config.build_manager().await?;
        let outcome = if self.force {
            manager.install().await
        } else {
            manager.check_and_install().await
        };

        if !manager.is_cli_installed() {
            bail!("stattrack is not installed at {}", manager.cli_location().display());
        }

        match outcome {
            InstallOutcome::Installed => {
                println!("✅ Installed stattrack at {}", manager.cli_location().display());
            }
            InstallOutcome::AlreadyCurrent => {
                println!("✅ stattrack is up to date at {}", manager.cli_location().display());
            }
            InstallOutcome::Failed => {
                println!(
                    "{} update failed, keeping {}",
                    "⚠".yellow(),
                    manager.cli_location().display()
                );
            }
        }
        Ok(())
    }
}
