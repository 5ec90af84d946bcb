//! trailfund - a command-line client for a trail-powered crowdfund.
//!
//! A wallet walks a fixed pipeline: approve the token, donate, and claim a
//! refund if the campaign fails. The trail API builds every transaction and
//! stores execution history; this crate decides which step may run next,
//! talks to the trail and the wallet signer, and formats the results.
//!
//! # Modules
//!
//! - [`pipeline`] - Steps, execution records, and the step sequencer
//! - [`trail`] - Typed client for the trail API
//! - [`history`] - Execution history with last-fetch-wins semantics
//! - [`campaign`] - Crowdfund reads and refund eligibility
//! - [`community`] - Campaign-wide activity feed
//! - [`executor`] - Running a step as a transaction
//! - [`wallet`] - Wallet addresses, connection state, and connectors
//! - [`chain`] - JSON-RPC client for signers and nodes
//! - [`units`] - Token amounts, dates, and explorer links
//! - [`config`] - Configuration loading, merging, and validation
//! - [`cli`] - Command-line interface
//! - [`ui`] - Prompts, spinners, and terminal output
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use trailfund::pipeline::{StepSequencer, StepState, Step};
//! use trailfund::wallet::{ConnectionState, WalletAddress};
//!
//! let wallet = WalletAddress::parse("0x1111111111111111111111111111111111111111").unwrap();
//! let connection = ConnectionState::watch_only(wallet);
//!
//! // No history yet: approving is the only thing to do.
//! let sequencer = StepSequencer::new(&connection, &[]);
//! assert_eq!(sequencer.status_of(Step::Approve).state, StepState::Active);
//! assert_eq!(sequencer.status_of(Step::Donate).state, StepState::Pending);
//! assert_eq!(sequencer.current_step(), 1);
//! ```

pub mod campaign;
pub mod chain;
pub mod cli;
pub mod community;
pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod pipeline;
pub mod trail;
pub mod ui;
pub mod units;
pub mod wallet;

pub use error::{Result, TrailfundError};
