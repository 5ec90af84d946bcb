//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, StatusArgs};
use crate::error::{Result, TrailfundError};
use crate::ui::UserInterface;

use super::campaign::CampaignCommand;
use super::community::CommunityCommand;
use super::completions::CompletionsCommand;
use super::config::ConfigCommand;
use super::context::CommandContext;
use super::history::HistoryCommand;
use super::status::StatusCommand;
use super::step::StepCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// Expected refusals (no wallet, step not executable yet) are reported
    /// through `ui` and a non-zero [`CommandResult`]; unexpected failures
    /// are returned as errors.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Everything except `completions` needs resolved configuration; a
    /// missing `--config` file exits with code 2.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if let Some(Commands::Completions(args)) = &cli.command {
            return CompletionsCommand::new(args.clone()).execute(ui);
        }

        let context = match CommandContext::load(
            &self.project_root,
            cli.config.as_deref(),
            cli.wallet.as_deref(),
        ) {
            Ok(context) => context,
            Err(TrailfundError::ConfigNotFound { path }) => {
                ui.error(&format!("Configuration not found: {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        match &cli.command {
            Some(Commands::Status(args)) => StatusCommand::new(&context, args.clone()).execute(ui),
            Some(Commands::History(args)) => {
                HistoryCommand::new(&context, args.clone()).execute(ui)
            }
            Some(Commands::Approve(args)) => StepCommand::approve(&context, args).execute(ui),
            Some(Commands::Donate(args)) => StepCommand::donate(&context, args).execute(ui),
            Some(Commands::Refund(args)) => StepCommand::refund(&context, args).execute(ui),
            Some(Commands::Campaign(args)) => {
                CampaignCommand::new(&context, args.clone()).execute(ui)
            }
            Some(Commands::Community(args)) => {
                CommunityCommand::new(&context, args.clone()).execute(ui)
            }
            Some(Commands::Config(args)) => ConfigCommand::new(
                &context,
                &self.project_root,
                cli.config.as_deref(),
                args.clone(),
            )
            .execute(ui),
            Some(Commands::Completions(args)) => {
                CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => StatusCommand::new(&context, StatusArgs::default()).execute(ui),
        }
    }
}
