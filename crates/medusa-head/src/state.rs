//! Head states and the recoverable-state chain
//!
//! The head lifecycle is a tagged union: `Idle` before anything is
//! observed, `Initial` while commits are collected, `Open` while snapshots
//! circulate, `Closed` during the contestation window, `Final` after fanout
//! or abort. Every chain-observation transition keeps the state it replaced
//! in `previous`, forming a linked history that only [`HeadState::rollback`]
//! ever reads.

use medusa_core::{
    HeadParameters, MultiSignature, Party, Signature, Snapshot, SnapshotNumber, Transaction,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The latest snapshot the head agrees on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum ConfirmedSnapshot<T: Transaction> {
    /// The opening snapshot, before any off-chain confirmation. Its UTxO
    /// comes from the collected commits and it confirms no transactions.
    Initial {
        /// Snapshot number 0.
        snapshot: Snapshot<T>,
    },
    /// A snapshot confirmed off-chain by every member.
    Confirmed {
        /// The confirmed snapshot.
        snapshot: Snapshot<T>,
        /// Aggregate signature covering all parties.
        signatures: MultiSignature,
    },
}

impl<T: Transaction> ConfirmedSnapshot<T> {
    /// The opening snapshot for a freshly collected head.
    pub fn genesis(utxo: T::UTxO) -> Self {
        ConfirmedSnapshot::Initial {
            snapshot: Snapshot::genesis(utxo),
        }
    }

    /// The underlying snapshot.
    pub fn snapshot(&self) -> &Snapshot<T> {
        match self {
            ConfirmedSnapshot::Initial { snapshot } => snapshot,
            ConfirmedSnapshot::Confirmed { snapshot, .. } => snapshot,
        }
    }

    /// The confirmed snapshot number.
    pub fn number(&self) -> SnapshotNumber {
        self.snapshot().number
    }

    /// The confirmed UTxO set.
    pub fn utxo(&self) -> &T::UTxO {
        &self.snapshot().utxo
    }

    /// The aggregate signature, absent for the opening snapshot.
    pub fn signatures(&self) -> Option<&MultiSignature> {
        match self {
            ConfirmedSnapshot::Initial { .. } => None,
            ConfirmedSnapshot::Confirmed { signatures, .. } => Some(signatures),
        }
    }
}

/// An in-flight snapshot awaiting acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum SeenSnapshot<T: Transaction> {
    /// No snapshot is in flight.
    None,
    /// A requested snapshot and the acknowledgements gathered so far.
    Seen {
        /// The requested snapshot.
        snapshot: Snapshot<T>,
        /// Signatures received, keyed by acknowledging party.
        acks: BTreeMap<Party, Signature>,
    },
}

impl<T: Transaction> SeenSnapshot<T> {
    /// The in-flight snapshot number, if any.
    pub fn number(&self) -> Option<SnapshotNumber> {
        match self {
            SeenSnapshot::None => None,
            SeenSnapshot::Seen { snapshot, .. } => Some(snapshot.number),
        }
    }
}

/// Per-`Open` bookkeeping of seen and confirmed snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub struct CoordinatedHeadState<T: Transaction> {
    /// Cache of applying `seen_txs` to the confirmed snapshot's UTxO.
    pub seen_utxo: T::UTxO,
    /// Locally known, applicable, not yet confirmed transactions.
    pub seen_txs: Vec<T>,
    /// The latest agreed snapshot.
    pub confirmed_snapshot: ConfirmedSnapshot<T>,
    /// The in-flight snapshot, if a request is circulating.
    pub seen_snapshot: SeenSnapshot<T>,
}

impl<T: Transaction> CoordinatedHeadState<T> {
    /// Fresh coordinated state for a head opening with `utxo`.
    pub fn new(utxo: T::UTxO) -> Self {
        Self {
            seen_utxo: utxo.clone(),
            seen_txs: Vec::new(),
            confirmed_snapshot: ConfirmedSnapshot::genesis(utxo),
            seen_snapshot: SeenSnapshot::None,
        }
    }
}

/// The head lifecycle state of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum HeadState<T: Transaction> {
    /// Nothing observed yet.
    Idle,
    /// A head is initializing; commits are being collected.
    Initial {
        /// Frozen head parameters.
        parameters: HeadParameters,
        /// Parties that have not committed yet.
        pending_commits: BTreeSet<Party>,
        /// Commits observed so far.
        committed: BTreeMap<Party, T::UTxO>,
        /// State before the chain observation that produced this one.
        previous: Box<HeadState<T>>,
    },
    /// The head is open; snapshots circulate off-chain.
    Open {
        /// Frozen head parameters.
        parameters: HeadParameters,
        /// Snapshot bookkeeping.
        coordinated: CoordinatedHeadState<T>,
        /// State before the chain observation that produced this one.
        previous: Box<HeadState<T>>,
    },
    /// The head was closed; the contestation window is running.
    Closed {
        /// Frozen head parameters.
        parameters: HeadParameters,
        /// The snapshot we would contest or fan out with.
        confirmed_snapshot: ConfirmedSnapshot<T>,
        /// State before the chain observation that produced this one.
        previous: Box<HeadState<T>>,
    },
    /// The head is finished; no further events apply.
    Final,
}

impl<T: Transaction> HeadState<T> {
    /// Rewind `depth` chain-observation layers.
    ///
    /// `Idle` and `Final` are fixed points; rewinding past the bottom of
    /// the chain stops at `Idle`.
    pub fn rollback(self, depth: u64) -> Self {
        let mut state = self;
        for _ in 0..depth {
            state = match state {
                HeadState::Idle => return HeadState::Idle,
                HeadState::Final => return HeadState::Final,
                HeadState::Initial { previous, .. }
                | HeadState::Open { previous, .. }
                | HeadState::Closed { previous, .. } => *previous,
            };
        }
        state
    }

    /// The head parameters, once a head exists.
    pub fn parameters(&self) -> Option<&HeadParameters> {
        match self {
            HeadState::Idle | HeadState::Final => None,
            HeadState::Initial { parameters, .. }
            | HeadState::Open { parameters, .. }
            | HeadState::Closed { parameters, .. } => Some(parameters),
        }
    }

    /// Whether the head is open.
    pub fn is_open(&self) -> bool {
        matches!(self, HeadState::Open { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medusa_core::{ContestationPeriod, SigningKey, UTxOSet};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct NoTx;

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    struct UnitUtxo;

    impl UTxOSet for UnitUtxo {
        fn union(self, _other: Self) -> Self {
            UnitUtxo
        }

        fn is_empty(&self) -> bool {
            true
        }
    }

    impl Transaction for NoTx {
        type Id = u64;
        type UTxO = UnitUtxo;

        fn id(&self) -> u64 {
            0
        }
    }

    fn params() -> HeadParameters {
        let party = Party::new(SigningKey::from_seed([1u8; 32]).verification_key());
        HeadParameters::new(ContestationPeriod::from_secs(1), vec![party]).expect("valid")
    }

    fn chain(depth: usize) -> HeadState<NoTx> {
        let mut state = HeadState::Idle;
        for _ in 0..depth {
            state = HeadState::Open {
                parameters: params(),
                coordinated: CoordinatedHeadState::new(UnitUtxo),
                previous: Box::new(state),
            };
        }
        state
    }

    #[test]
    fn test_rollback_zero_is_identity() {
        let state = chain(3);
        assert_eq!(state.clone().rollback(0), state);
    }

    #[test]
    fn test_rollback_composes() {
        let state = chain(5);
        assert_eq!(
            state.clone().rollback(2).rollback(1),
            state.rollback(3)
        );
    }

    #[test]
    fn test_rollback_bottoms_out_at_idle() {
        let state = chain(2);
        assert_eq!(state.rollback(10), HeadState::Idle);
        assert_eq!(HeadState::<NoTx>::Idle.rollback(4), HeadState::Idle);
    }

    #[test]
    fn test_confirmed_snapshot_accessors() {
        let confirmed = ConfirmedSnapshot::<NoTx>::genesis(UnitUtxo);
        assert_eq!(confirmed.number(), SnapshotNumber::GENESIS);
        assert!(confirmed.signatures().is_none());
        assert!(confirmed.snapshot().confirmed.is_empty());
    }
}
