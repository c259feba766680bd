//! Effects emitted by the reducer
//!
//! Effects are data, never callbacks: the outer runtime dispatches them in
//! list order. Network and chain effects may be pipelined independently by
//! the runtime; client effect ordering relative to other effects is
//! preserved.

use crate::events::{Event, Message};
use crate::outcome::WaitReason;
use crate::state::ConfirmedSnapshot;
use medusa_core::{
    HeadParameters, MultiSignature, Party, Snapshot, SnapshotNumber, Transaction,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outputs pushed to local clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum ServerOutput<T: Transaction> {
    /// A peer connected at the transport level.
    PeerConnected {
        /// The peer's host address.
        host: String,
    },
    /// A peer disconnected at the transport level.
    PeerDisconnected {
        /// The peer's host address.
        host: String,
    },
    /// A head we are part of started initializing.
    HeadIsInitializing {
        /// The head members.
        parties: Vec<Party>,
    },
    /// All commits were collected; the head is open.
    HeadIsOpen {
        /// The opening UTxO set.
        utxo: T::UTxO,
    },
    /// A snapshot was confirmed by every member.
    SnapshotConfirmed {
        /// The confirmed snapshot.
        snapshot: Snapshot<T>,
        /// The aggregate signature over it.
        signatures: MultiSignature,
    },
    /// The chain rolled back and the head state was rewound.
    RolledBack,
    /// The head was closed on chain.
    HeadIsClosed {
        /// Number of the snapshot the close was posted with.
        snapshot_number: SnapshotNumber,
        /// End of the contestation window, epoch millis.
        contestation_deadline_ms: u64,
    },
    /// The head's final UTxO was fanned out on chain.
    HeadIsFinalized {
        /// The distributed UTxO set.
        utxo: T::UTxO,
    },
    /// The initializing head was aborted.
    HeadIsAborted {
        /// The committed outputs returned to their owners.
        utxo: T::UTxO,
    },
    /// Reply to a `GetUTxO` command.
    UTxO {
        /// The locally seen UTxO set.
        utxo: T::UTxO,
    },
}

/// Main-chain transactions the runtime must submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum PostChainTx<T: Transaction> {
    /// Initialize a head.
    InitTx {
        /// The parameters to freeze on chain.
        parameters: HeadParameters,
    },
    /// Commit outputs into the initializing head.
    CommitTx {
        /// The committing party (always ourselves).
        party: Party,
        /// The outputs to commit.
        utxo: T::UTxO,
    },
    /// Collect all commits and open the head.
    CollectComTx,
    /// Close the head with our confirmed snapshot.
    CloseTx {
        /// The snapshot to close with.
        confirmed_snapshot: ConfirmedSnapshot<T>,
    },
    /// Contest a close with our newer confirmed snapshot.
    ContestTx {
        /// The snapshot to contest with.
        confirmed_snapshot: ConfirmedSnapshot<T>,
    },
    /// Distribute the final UTxO set after the contestation window.
    FanoutTx {
        /// The snapshot to fan out.
        confirmed_snapshot: ConfirmedSnapshot<T>,
    },
    /// Abort the initializing head.
    AbortTx,
}

/// One effect for the runtime to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum Effect<T: Transaction> {
    /// Push an output to local clients.
    Client {
        /// The output to push.
        output: ServerOutput<T>,
    },
    /// Broadcast a message to all peers.
    Network {
        /// The message to broadcast.
        message: Message<T>,
    },
    /// Submit a transaction to the main chain.
    Chain {
        /// The transaction to post.
        tx: PostChainTx<T>,
    },
    /// Re-deliver `event` to this head after `delay`.
    Delay {
        /// How long the runtime must wait.
        delay: Duration,
        /// Why the delivery is delayed.
        reason: WaitReason,
        /// The event to re-deliver.
        event: Box<Event<T>>,
    },
}

impl<T: Transaction> Effect<T> {
    /// A client push effect.
    pub fn client(output: ServerOutput<T>) -> Self {
        Effect::Client { output }
    }

    /// A peer broadcast effect.
    pub fn network(message: Message<T>) -> Self {
        Effect::Network { message }
    }

    /// A chain submission effect.
    pub fn chain(tx: PostChainTx<T>) -> Self {
        Effect::Chain { tx }
    }

    /// A delayed self-delivery effect.
    pub fn delay(delay: Duration, reason: WaitReason, event: Event<T>) -> Self {
        Effect::Delay {
            delay,
            reason,
            event: Box::new(event),
        }
    }
}
