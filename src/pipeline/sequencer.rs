//! Step status derivation.
//!
//! [`StepSequencer`] decides, from a wallet's execution history, which
//! pipeline step is done, which one may run next, and which are still
//! out of reach. It is a pure function of its inputs: it never performs
//! I/O, never mutates the history it is given, and can be rebuilt from
//! scratch every time new history arrives.
//!
//! # Example
//!
//! ```
//! use trailfund::pipeline::{StepSequencer, StepState};
//! use trailfund::wallet::{ConnectionState, WalletAddress};
//!
//! let wallet = ConnectionState::watch_only(WalletAddress::zero());
//! let sequencer = StepSequencer::new(&wallet, &[]);
//!
//! assert_eq!(sequencer.step_status(1).state, StepState::Active);
//! assert_eq!(sequencer.step_status(2).state, StepState::Pending);
//! assert_eq!(sequencer.current_step(), 1);
//! ```

use std::fmt;

use serde::Serialize;

use crate::wallet::ConnectionState;

use super::execution::Execution;
use super::step::{Step, PIPELINE_LENGTH};

/// Where a step stands for the current wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// Not reachable yet.
    Pending,
    /// The next step to execute.
    Active,
    /// Already executed in the latest execution.
    Completed,
    /// No wallet connected.
    Disabled,
}

impl StepState {
    /// Ordering used for progress comparisons: disabled < pending < active < completed.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Pending => 1,
            Self::Active => 2,
            Self::Completed => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived status of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepStatus {
    #[serde(rename = "status")]
    pub state: StepState,
    pub can_execute: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
}

impl StepStatus {
    fn plain(state: StepState, can_execute: bool) -> Self {
        Self {
            state,
            can_execute,
            tx_hash: None,
            execution_id: None,
        }
    }
}

/// Select the execution with the greatest `updated_at`.
///
/// Ties go to the execution that appears first.
pub fn latest_execution(executions: &[Execution]) -> Option<&Execution> {
    executions.iter().fold(None, |latest: Option<&Execution>, current| match latest {
        Some(l) if current.updated_at <= l.updated_at => Some(l),
        _ => Some(current),
    })
}

/// Computes step statuses for one wallet from its execution history.
#[derive(Debug, Clone, Copy)]
pub struct StepSequencer<'a> {
    connected: bool,
    latest: Option<&'a Execution>,
}

impl<'a> StepSequencer<'a> {
    /// Build a sequencer for the given connection and history.
    pub fn new(connection: &ConnectionState, executions: &'a [Execution]) -> Self {
        Self {
            connected: connection.is_connected(),
            latest: latest_execution(executions),
        }
    }

    /// The execution statuses are derived from.
    pub fn latest_execution(&self) -> Option<&'a Execution> {
        self.latest
    }

    /// Highest step number in the latest execution, or 0.
    pub fn max_completed_step(&self) -> u32 {
        self.latest.map(|e| e.max_step_number()).unwrap_or(0)
    }

    /// Status of the step with the given 1-based number.
    pub fn step_status(&self, step_number: u32) -> StepStatus {
        if !self.connected {
            return StepStatus::plain(StepState::Disabled, false);
        }

        if let Some(latest) = self.latest {
            if let Some(executed) = latest.step(step_number) {
                return StepStatus {
                    state: StepState::Completed,
                    can_execute: true,
                    tx_hash: Some(executed.tx_hash.clone()),
                    execution_id: Some(latest.id.clone()),
                };
            }
        }

        let next = self.max_completed_step() + 1;
        if step_number == next {
            StepStatus::plain(StepState::Active, true)
        } else {
            // Either a future step or a gap in history before `next`.
            StepStatus::plain(StepState::Pending, false)
        }
    }

    /// Status of a pipeline step.
    pub fn status_of(&self, step: Step) -> StepStatus {
        self.step_status(step.number())
    }

    /// Statuses of all steps in pipeline order.
    pub fn statuses(&self) -> Vec<(Step, StepStatus)> {
        Step::ALL
            .iter()
            .map(|step| (*step, self.status_of(*step)))
            .collect()
    }

    /// Step to focus by default: one past the highest completed, capped at the last step.
    pub fn current_step(&self) -> u32 {
        (self.max_completed_step() + 1).min(PIPELINE_LENGTH)
    }

    /// The single step that is `active`, if any.
    pub fn next_executable(&self) -> Option<Step> {
        if !self.connected {
            return None;
        }
        Step::from_number(self.max_completed_step() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ExecutionStep;
    use crate::wallet::WalletAddress;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn connected() -> ConnectionState {
        ConnectionState::watch_only(WalletAddress::zero())
    }

    fn execution(id: &str, updated: i64, steps: &[u32]) -> Execution {
        steps.iter().fold(Execution::new(id, at(updated)), |e, n| {
            e.with_step(ExecutionStep::new(*n, format!("0x{}{}", id, n)))
        })
    }

    fn states(seq: &StepSequencer<'_>) -> Vec<StepState> {
        (1..=3).map(|n| seq.step_status(n).state).collect()
    }

    #[test]
    fn empty_history_activates_first_step() {
        let wallet = connected();
        let seq = StepSequencer::new(&wallet, &[]);

        assert_eq!(
            states(&seq),
            vec![StepState::Active, StepState::Pending, StepState::Pending]
        );
        assert!(seq.step_status(1).can_execute);
        assert!(!seq.step_status(2).can_execute);
        assert_eq!(seq.current_step(), 1);
        assert_eq!(seq.next_executable(), Some(Step::Approve));
    }

    #[test]
    fn execution_with_no_steps_behaves_like_empty_history() {
        let wallet = connected();
        let history = vec![execution("a", 10, &[])];
        let seq = StepSequencer::new(&wallet, &history);

        assert_eq!(seq.step_status(1).state, StepState::Active);
        assert_eq!(seq.current_step(), 1);
    }

    #[test]
    fn completed_step_surfaces_hash_and_execution() {
        let wallet = connected();
        let history = vec![execution("a", 10, &[1])];
        let seq = StepSequencer::new(&wallet, &history);

        let status = seq.step_status(1);
        assert_eq!(status.state, StepState::Completed);
        assert!(status.can_execute);
        assert_eq!(status.tx_hash.as_deref(), Some("0xa1"));
        assert_eq!(status.execution_id.as_deref(), Some("a"));
        assert_eq!(seq.step_status(2).state, StepState::Active);
        assert_eq!(seq.step_status(3).state, StepState::Pending);
        assert_eq!(seq.current_step(), 2);
    }

    #[test]
    fn disconnected_disables_everything() {
        let history = vec![execution("a", 10, &[1, 2])];
        for wallet in [ConnectionState::Disconnected, ConnectionState::Connecting] {
            let seq = StepSequencer::new(&wallet, &history);
            for n in 1..=3 {
                let status = seq.step_status(n);
                assert_eq!(status.state, StepState::Disabled);
                assert!(!status.can_execute);
                assert!(status.tx_hash.is_none());
            }
            assert_eq!(seq.next_executable(), None);
        }
    }

    #[test]
    fn latest_execution_wins() {
        let wallet = connected();
        let history = vec![execution("old", 10, &[1, 2]), execution("new", 20, &[1])];
        let seq = StepSequencer::new(&wallet, &history);

        assert_eq!(seq.latest_execution().unwrap().id, "new");
        assert_eq!(seq.step_status(2).state, StepState::Active);
    }

    #[test]
    fn ties_go_to_first_encountered() {
        let history = vec![execution("first", 10, &[1]), execution("second", 10, &[1, 2])];
        assert_eq!(latest_execution(&history).unwrap().id, "first");
    }

    #[test]
    fn gap_in_history_is_pending_not_error() {
        let wallet = connected();
        let history = vec![execution("a", 10, &[1, 3])];
        let seq = StepSequencer::new(&wallet, &history);

        let step2 = seq.step_status(2);
        assert_eq!(step2.state, StepState::Pending);
        assert!(!step2.can_execute);
        assert_eq!(seq.step_status(3).state, StepState::Completed);
        assert_eq!(seq.current_step(), 3);
        assert_eq!(seq.next_executable(), None);
    }

    #[test]
    fn all_steps_completed_caps_current_step() {
        let wallet = connected();
        let history = vec![execution("a", 10, &[1, 2, 3])];
        let seq = StepSequencer::new(&wallet, &history);

        assert_eq!(seq.current_step(), 3);
        assert_eq!(seq.next_executable(), None);
        assert!(seq.statuses().iter().all(|(_, s)| s.state == StepState::Completed));
    }

    #[test]
    fn out_of_range_step_numbers_are_tolerated() {
        let wallet = connected();
        let history = vec![execution("a", 10, &[7])];
        let seq = StepSequencer::new(&wallet, &history);

        assert_eq!(seq.current_step(), 3);
        assert_eq!(seq.step_status(1).state, StepState::Pending);
        assert_eq!(seq.step_status(0).state, StepState::Pending);
    }

    #[test]
    fn statuses_are_in_pipeline_order() {
        let wallet = connected();
        let seq = StepSequencer::new(&wallet, &[]);
        let steps: Vec<Step> = seq.statuses().into_iter().map(|(s, _)| s).collect();
        assert_eq!(steps, Step::ALL.to_vec());
    }

    #[test]
    fn status_serializes_with_status_key() {
        let status = StepStatus::plain(StepState::Active, true);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["can_execute"], true);
        assert!(json.get("tx_hash").is_none());
    }

    #[test]
    fn rank_orders_progress() {
        assert!(StepState::Pending.rank() < StepState::Active.rank());
        assert!(StepState::Active.rank() < StepState::Completed.rank());
    }
}
