//! Orchestration state and the synchronous rejection taxonomy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::features::dispatch::RequestOutcome;
use crate::features::modes::InvalidModeIndex;
use crate::features::timer::TimerError;

/// The single shared value driving the display. The orchestrator is the only
/// writer; subscribers receive read-only snapshots.
///
/// One cycle runs `Idle -> Pending -> Rendering -> Done`; `Done` transitions
/// back only on the next submission. The state is fully replaced, never
/// merged, when a new submission validates.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestrationState {
    Idle,
    Pending {
        started_at: DateTime<Utc>,
        /// Whole seconds since the request went out, advanced by timer ticks.
        elapsed_seconds: u64,
    },
    Rendering {
        full_text: String,
        /// Characters of `full_text` revealed so far.
        revealed_prefix_len: usize,
    },
    Done {
        outcome: RequestOutcome,
    },
}

/// Rejections surfaced synchronously at the call that caused them. Dispatch
/// failures are not errors at this level; they resolve into
/// [`RequestOutcome::Failure`] inside a `Done` state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    /// Input was empty or whitespace-only; rejected before any network
    /// activity or state change.
    #[error("query must not be empty")]
    EmptyQuery,

    /// A submission is already pending; the user must wait for it to
    /// resolve.
    #[error("a request is already in flight")]
    RequestInFlight,

    #[error(transparent)]
    InvalidModeIndex(#[from] InvalidModeIndex),

    #[error(transparent)]
    Timer(#[from] TimerError),
}
