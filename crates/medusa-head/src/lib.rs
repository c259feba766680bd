//! # Medusa Head - Layer 2: Head Logic
//!
//! The deterministic, side-effect-free state machine that drives a
//! coordinated multi-party head. The single entry point is [`update`]: given
//! the node environment, a ledger capability, the current [`HeadState`] and
//! one incoming [`Event`], it produces an [`Outcome`]: a new state plus the
//! effects the outer runtime must dispatch, or an instruction to wait or
//! reject.
//!
//! # Design Principles
//!
//! 1. **Pure functions only**: no I/O, no clocks, no locks; the reducer
//!    never mutates its inputs.
//! 2. **Deterministic**: identical inputs produce identical outcomes,
//!    including effect order (the dispatch order).
//! 3. **Effects as data**: the runtime interprets [`Effect`] values; the
//!    core never calls back into it.
//! 4. **Wait is not Error**: a [`Outcome::Wait`] event may become valid
//!    after a later state change and must be re-delivered; an
//!    [`Outcome::Error`] event never becomes valid for the state it hit.

#![forbid(unsafe_code)]

pub mod effects;
pub mod events;
pub mod outcome;
pub mod snapshots;
pub mod state;
pub mod update;

pub use effects::{Effect, PostChainTx, ServerOutput};
pub use events::{ChainEvent, ClientCommand, Event, Message, OnChainTx};
pub use outcome::{LogicError, Outcome, WaitReason};
pub use state::{ConfirmedSnapshot, CoordinatedHeadState, HeadState, SeenSnapshot};
pub use update::update;
