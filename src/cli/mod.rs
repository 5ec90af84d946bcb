//! Command-line interface for trailfund.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    ApproveArgs, CampaignArgs, Cli, Commands, CommunityArgs, ConfigArgs, DonateArgs,
    HistoryArgs, RefundArgs, StatusArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
