use crate::state::StateId;
use thiserror::Error;

/// Errors reported by the state machine.
#[derive(Debug, Error)]
pub enum FsmError {
    /// The machine was driven before an initial state was set.
    #[error("State machine has no initial state")]
    NotInitialized,
    /// `set_initial` was called on a machine that is already running.
    #[error("State machine is already initialized")]
    AlreadyInitialized,
    /// The handle does not belong to a state registered with this machine.
    #[error("Unknown state: {0}")]
    UnknownState(StateId),
    /// A transition references a state that can never become active.
    #[error("Transition leaves state '{state}' which is unreachable from the initial state")]
    DanglingTransitionTarget { state: String },
    /// A fallible guard returned an error.
    #[error("Guard of transition to '{target}' failed: {source}")]
    Guard {
        target: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Type alias for a result type that can contain an [`FsmError`].
pub type FsmResult<T> = Result<T, FsmError>;
