//! Reducer outcomes
//!
//! Every call to `update` returns exactly one `Outcome`. The three-way
//! split is load-bearing: `NewState` advances, `Wait` asks the runtime to
//! re-deliver the event after a later state change, `Error` marks the event
//! permanently invalid for the state it hit. Collapsing `Wait` into `Error`
//! would stall the protocol; collapsing `Error` into `Wait` would loop it.

use crate::effects::Effect;
use crate::events::Event;
use crate::state::HeadState;
use medusa_core::{SnapshotNumber, Transaction, ValidationError};
use serde::{Deserialize, Serialize};

/// Why an event must be re-delivered later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WaitReason {
    /// A transaction does not apply to the current UTxO set; a snapshot
    /// confirmation may clear the obstruction.
    #[error("transaction does not currently apply: {error}")]
    WaitOnNotApplicableTx {
        /// The ledger's validation failure.
        error: ValidationError,
    },
    /// The referenced snapshot has not been seen yet.
    #[error("waiting for a seen snapshot")]
    WaitOnSeenSnapshot,
    /// An earlier snapshot is still in flight.
    #[error("waiting for snapshot {snapshot_number} to settle")]
    WaitOnSnapshotNumber {
        /// The in-flight snapshot number.
        snapshot_number: SnapshotNumber,
    },
    /// The contestation window is still running.
    #[error("waiting for the contestation period to elapse")]
    WaitOnContestationPeriod,
}

/// Why an event is permanently invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(bound = "T: Transaction")]
pub enum LogicError<T: Transaction> {
    /// The event cannot happen in the current state.
    #[error("event not valid in the current head state")]
    InvalidEvent {
        /// The offending event.
        event: Box<Event<T>>,
        /// The state it was delivered in.
        state: Box<HeadState<T>>,
    },
    /// A protocol requirement failed.
    #[error("requirement failed: {requirement}")]
    RequireFailed {
        /// Description of the failed requirement.
        requirement: String,
    },
    /// We observed the initialization of a head we are not part of.
    #[error("observed init transaction for a head we are not part of")]
    NotOurHead,
}

/// The result of one reducer step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum Outcome<T: Transaction> {
    /// Advance to `state` and dispatch `effects` in order.
    NewState {
        /// The next head state.
        state: HeadState<T>,
        /// Effects in dispatch order.
        effects: Vec<Effect<T>>,
    },
    /// Re-deliver the event after a later state change.
    Wait {
        /// Why the event cannot be processed yet.
        reason: WaitReason,
    },
    /// The event is invalid for the current state; state is unchanged.
    Error {
        /// The protocol violation.
        error: LogicError<T>,
    },
}

impl<T: Transaction> Outcome<T> {
    /// Advance with effects.
    pub fn next(state: HeadState<T>, effects: Vec<Effect<T>>) -> Self {
        Outcome::NewState { state, effects }
    }

    /// Keep the state and emit nothing: the silent-drop outcome.
    pub fn unchanged(state: &HeadState<T>) -> Self {
        Outcome::NewState {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    /// Ask for re-delivery.
    pub fn wait(reason: WaitReason) -> Self {
        Outcome::Wait { reason }
    }

    /// Reject an event as invalid for the given state.
    pub fn invalid(event: Event<T>, state: &HeadState<T>) -> Self {
        Outcome::Error {
            error: LogicError::InvalidEvent {
                event: Box::new(event),
                state: Box::new(state.clone()),
            },
        }
    }

    /// Reject with a failed requirement.
    pub fn require_failed(requirement: impl Into<String>) -> Self {
        Outcome::Error {
            error: LogicError::RequireFailed {
                requirement: requirement.into(),
            },
        }
    }

    /// Reject an init observation for a foreign head.
    pub fn not_our_head() -> Self {
        Outcome::Error {
            error: LogicError::NotOurHead,
        }
    }

    /// The new state, if this outcome advances.
    pub fn state(&self) -> Option<&HeadState<T>> {
        match self {
            Outcome::NewState { state, .. } => Some(state),
            _ => None,
        }
    }

    /// The emitted effects; empty for `Wait` and `Error`.
    pub fn effects(&self) -> &[Effect<T>] {
        match self {
            Outcome::NewState { effects, .. } => effects,
            _ => &[],
        }
    }
}
