//! Events fed into the reducer
//!
//! Everything the outer runtime can tell the head logic: client commands,
//! peer messages, chain observations, and the self-delivered fanout timer.
//! `Message` is the peer wire format; its variant tags (`ReqTx`, `ReqSn`,
//! `AckSn`, `Connected`, `Disconnected`) and field names are a public
//! contract pinned by golden tests.

use medusa_core::{
    HeadParameters, Party, Signature, SnapshotNumber, Transaction,
};
use serde::{Deserialize, Serialize};

/// Commands issued by a local client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum ClientCommand<T: Transaction> {
    /// Initialize a new head with the configured peers.
    Init,
    /// Commit a UTxO set into the initializing head.
    Commit {
        /// Outputs to commit.
        utxo: T::UTxO,
    },
    /// Submit a new transaction to the open head.
    NewTx {
        /// The transaction to broadcast and apply.
        transaction: T,
    },
    /// Close the open head with the latest confirmed snapshot.
    Close,
    /// Contest a close with our latest confirmed snapshot.
    Contest,
    /// Ask for the locally seen UTxO set.
    GetUTxO,
    /// Abort an initializing head.
    Abort,
}

/// Messages exchanged between head members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum Message<T: Transaction> {
    /// Request that peers apply a transaction to their seen ledger.
    ReqTx {
        /// Sending party.
        from: Party,
        /// The transaction to apply.
        transaction: T,
    },
    /// Leader's request to produce a snapshot.
    ReqSn {
        /// Sending party; must be the leader for `snapshot_number`.
        from: Party,
        /// The requested snapshot number.
        snapshot_number: SnapshotNumber,
        /// Transactions the snapshot confirms, in application order.
        transactions: Vec<T>,
    },
    /// A party's signature over a requested snapshot.
    AckSn {
        /// Acknowledging party.
        from: Party,
        /// Signature over the snapshot's canonical bytes.
        signature: Signature,
        /// The snapshot number being acknowledged.
        snapshot_number: SnapshotNumber,
    },
    /// Transport-level notification that a peer connected.
    Connected {
        /// The peer's host address.
        host: String,
    },
    /// Transport-level notification that a peer disconnected.
    Disconnected {
        /// The peer's host address.
        host: String,
    },
}

/// Transactions observed on the main chain, already interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum OnChainTx<T: Transaction> {
    /// A head was initialized with these parameters.
    OnInitTx {
        /// The frozen head parameters.
        parameters: HeadParameters,
    },
    /// A party committed outputs into the initializing head.
    OnCommitTx {
        /// The committing party.
        party: Party,
        /// The committed outputs.
        utxo: T::UTxO,
    },
    /// All commits were collected; the head is open.
    OnCollectComTx,
    /// The initializing head was aborted.
    OnAbortTx,
    /// The head was closed with some snapshot.
    OnCloseTx {
        /// Number of the snapshot the close was posted with.
        snapshot_number: SnapshotNumber,
        /// Chain-computed end of the contestation window, epoch millis.
        contestation_deadline_ms: u64,
    },
    /// A party contested the close.
    OnContestTx {
        /// Number of the snapshot the contest was posted with.
        snapshot_number: SnapshotNumber,
    },
    /// The head's final UTxO set was fanned out; the head is finished.
    OnFanoutTx,
}

/// Events reported by the chain observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum ChainEvent<T: Transaction> {
    /// A head transaction was observed on chain.
    Observation {
        /// The interpreted transaction.
        tx: OnChainTx<T>,
    },
    /// The chain rolled back this many observed head transactions.
    Rollback {
        /// Number of observation layers to rewind.
        depth: u64,
    },
    /// Chain time progressed.
    Tick {
        /// Current chain time, epoch millis.
        now_ms: u64,
    },
}

/// One input to the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub enum Event<T: Transaction> {
    /// A command from a local client.
    Client {
        /// The command.
        command: ClientCommand<T>,
    },
    /// A message from a peer.
    Network {
        /// The received message.
        message: Message<T>,
    },
    /// A chain observer report.
    Chain {
        /// The chain event.
        event: ChainEvent<T>,
    },
    /// Self-delivered timer: the contestation period elapsed.
    ShouldPostFanout,
}

impl<T: Transaction> Event<T> {
    /// Wrap a client command.
    pub fn client(command: ClientCommand<T>) -> Self {
        Event::Client { command }
    }

    /// Wrap a peer message.
    pub fn network(message: Message<T>) -> Self {
        Event::Network { message }
    }

    /// Wrap a chain observation.
    pub fn observation(tx: OnChainTx<T>) -> Self {
        Event::Chain {
            event: ChainEvent::Observation { tx },
        }
    }

    /// Wrap a rollback notification.
    pub fn rollback(depth: u64) -> Self {
        Event::Chain {
            event: ChainEvent::Rollback { depth },
        }
    }
}
