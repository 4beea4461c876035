//! Clap derive structures for the `guildctl` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// guildctl -- declarative Discord guild provisioning
#[derive(Debug, Parser)]
#[command(
    name = "guildctl",
    version,
    about = "Converge a Discord guild to a declarative manifest",
    long_about = "Provisions roles, categories, and channels in a Discord guild\n\
        from a TOML manifest. Safe to re-run: existing entities are adopted\n\
        by name, never duplicated or modified.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the guild manifest
    #[arg(
        long,
        short = 'f',
        env = "GUILDCTL_MANIFEST",
        default_value = "guild.toml",
        global = true
    )]
    pub manifest: PathBuf,

    /// Discord bot token
    #[arg(long, env = "DISCORD_BOT_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Discord API base URL (testing only)
    #[arg(long, env = "GUILDCTL_API_BASE", global = true, hide = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one `name id` pair per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile the guild against the manifest
    #[command(alias = "up")]
    Apply(ApplyArgs),

    /// Validate the manifest without contacting Discord
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Where to write the resolved name -> id artifact
    #[arg(long, default_value = "discord_config.json")]
    pub out: PathBuf,

    /// Skip writing the artifact
    #[arg(long)]
    pub no_artifact: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
