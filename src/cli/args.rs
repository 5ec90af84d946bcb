//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Trailfund - approve, donate, and refund on a trail-powered crowdfund.
#[derive(Debug, Parser)]
#[command(name = "trailfund")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (layered over .trailfund/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Wallet address to act as (overrides wallet.address and TRAILFUND_WALLET)
    #[arg(short, long, global = true, value_name = "ADDRESS")]
    pub wallet: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the step pipeline for the wallet (default if no command specified)
    Status(StatusArgs),

    /// Show the wallet's execution history
    History(HistoryArgs),

    /// Step 1: allow the crowdfund contract to spend your tokens
    Approve(ApproveArgs),

    /// Step 2: donate to the crowdfund
    Donate(DonateArgs),

    /// Step 3: claim a refund if the goal was not reached
    Refund(RefundArgs),

    /// Show campaign progress and your position
    Campaign(CampaignArgs),

    /// Show recent activity from all donors
    Community(CommunityArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `history` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct HistoryArgs {
    /// Number of executions to show (most recent first)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `approve` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ApproveArgs {
    /// Amount in whole tokens, e.g. 12.5
    pub amount: String,

    /// Send without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `donate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DonateArgs {
    /// Amount in whole tokens, e.g. 12.5
    pub amount: String,

    /// Amount approved in step 1; donations above it are refused
    #[arg(long, value_name = "AMOUNT")]
    pub approved: Option<String>,

    /// Send without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `refund` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RefundArgs {
    /// Send without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `campaign` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CampaignArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `community` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CommunityArgs {
    /// Keep refreshing every community.refresh_secs seconds
    #[arg(long)]
    pub watch: bool,

    /// Number of feed entries to show (overrides community.feed_limit)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long, conflicts_with = "watch")]
    pub json: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the JSON Schema of the config file instead
    #[arg(long)]
    pub schema: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["trailfund"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn donate_parses_amount_and_flags() {
        let cli = Cli::try_parse_from([
            "trailfund",
            "donate",
            "12.5",
            "--approved",
            "20",
            "--yes",
            "--wallet",
            "0x1111111111111111111111111111111111111111",
        ])
        .unwrap();

        assert!(cli.wallet.is_some());
        match cli.command {
            Some(Commands::Donate(args)) => {
                assert_eq!(args.amount, "12.5");
                assert_eq!(args.approved.as_deref(), Some("20"));
                assert!(args.yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn approve_requires_amount() {
        assert!(Cli::try_parse_from(["trailfund", "approve"]).is_err());
    }

    #[test]
    fn community_json_conflicts_with_watch() {
        assert!(Cli::try_parse_from(["trailfund", "community", "--watch", "--json"]).is_err());
    }
}
