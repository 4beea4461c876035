//! `guildctl check` — offline manifest validation.

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let desired = config::load_manifest(global)?;

    if !global.quiet {
        let channels: usize = desired.categories.iter().map(|c| c.channels.len()).sum();
        println!(
            "manifest ok: guild {} ({} roles, {} categories, {} channels)",
            desired.guild_id,
            desired.roles.len(),
            desired.categories.len(),
            channels,
        );
    }
    Ok(())
}
