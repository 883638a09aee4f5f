//! `platform` command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use crate::release::is_supported;

/// Print the detected platform and the release it resolves to.
#[derive(Args)]
pub struct PlatformCommand {}

impl PlatformCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let manager = config.build_manager().await?;
        let signature = manager.platform();
        let resolver = manager.resolver();

        let kernel = resolver.kernel_release();
        let supported = if is_supported(signature) { "yes".green() } else { "no".red() };

        println!("{}", "Platform".bold());
        println!("  Label:     {}", signature.label());
        println!("  Kernel:    {}", if kernel.is_empty() { "unknown" } else { kernel });
        println!("  Supported: {supported}");
        if let Some(tag) = resolver.legacy_tag(signature) {
            println!("  Legacy:    {tag}");
        }
        println!("  Release:   {}", resolver.target_tag(signature));
        println!("  Download:  {}", resolver.preview_url(signature));
        Ok(())
    }
}
