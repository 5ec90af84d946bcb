//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! configuration once into a [`CommandContext`] and routes CLI subcommands
//! to their implementations.

pub mod campaign;
pub mod community;
pub mod completions;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod history;
pub mod status;
pub mod step;

pub use context::CommandContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
