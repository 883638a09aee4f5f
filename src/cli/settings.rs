//! `settings` command.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};

use super::CliConfig;
use crate::settings::{FileSettings, SettingsProvider};

/// Read or write a stored setting.
///
/// ```bash
/// stattrack-deps settings set settings proxy http://proxy.local:3128
/// stattrack-deps settings get internal cli_version_last_accessed --internal
/// ```
#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommands,
}

#[derive(Subcommand)]
enum SettingsSubcommands {
    /// Print a setting; exits with an error if it is not set
    Get {
        namespace: String,
        key: String,
        /// Use the internal settings file
        #[arg(long)]
        internal: bool,
    },

    /// Store a setting
    Set {
        namespace: String,
        key: String,
        value: String,
        /// Use the internal settings file
        #[arg(long)]
        internal: bool,
    },
}

impl SettingsCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let manager_config = config.load_config().await?;
        let store = FileSettings::new(
            manager_config.settings_path()?,
            manager_config.internal_settings_path()?,
        );

        match self.command {
            SettingsSubcommands::Get {
                namespace,
                key,
                internal,
            } => match store.get(&namespace, &key, internal).await? {
                Some(value) => println!("{value}"),
                None => bail!("{namespace}.{key} is not set"),
            },
            SettingsSubcommands::Set {
                namespace,
                key,
                value,
                internal,
            } => {
                store.set(&namespace, &key, &value, internal).await?;
                println!("✅ Set {namespace}.{key}");
            }
        }
        Ok(())
    }
}
