//! The fixed Approve → Donate → Refund pipeline.
//!
//! - [`step`] - the three pipeline steps and their display text
//! - [`execution`] - validated execution history records
//! - [`sequencer`] - per-step status derivation from history

pub mod execution;
pub mod sequencer;
pub mod step;

pub use execution::{Execution, ExecutionStep};
pub use sequencer::{latest_execution, StepSequencer, StepState, StepStatus};
pub use step::{Step, PIPELINE_LENGTH};
