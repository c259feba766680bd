//! Shared helpers for head-logic integration tests
//!
//! Drives the reducer with the fixed three-party cast: parties
//! `[alice, bob, carol]` in that frozen order, the local node being bob,
//! and a 42 second contestation period.

#![allow(dead_code)]

use medusa_core::{
    ContestationPeriod, Environment, HeadParameters, MultiSignature, Party, SigningKey, Snapshot,
    SnapshotNumber,
};
use medusa_head::{
    update, ConfirmedSnapshot, CoordinatedHeadState, Effect, Event, HeadState, Message, Outcome,
    SeenSnapshot,
};
use medusa_testkit::{alice, bob, carol, three_party_environment, three_party_parameters};
use medusa_testkit::{SimpleLedger, SimpleTx, SimpleUtxo};

/// Contestation period used throughout the scenarios.
pub const CONTESTATION_SECS: u64 = 42;

pub fn contestation_period() -> ContestationPeriod {
    ContestationPeriod::from_secs(CONTESTATION_SECS)
}

pub fn parameters() -> HeadParameters {
    three_party_parameters(contestation_period())
}

/// The local node's environment: bob.
pub fn bob_environment() -> Environment {
    three_party_environment(bob(), contestation_period())
}

pub fn party_of(key: &SigningKey) -> Party {
    Party::new(key.verification_key())
}

/// An open head with no history beyond its opening.
pub fn open_head(utxo: SimpleUtxo) -> HeadState<SimpleTx> {
    HeadState::Open {
        parameters: parameters(),
        coordinated: CoordinatedHeadState::new(utxo),
        previous: Box::new(HeadState::Idle),
    }
}

/// An open head whose latest confirmed snapshot has the given number.
pub fn open_head_confirmed_at(number: u64, utxo: SimpleUtxo) -> HeadState<SimpleTx> {
    let snapshot = Snapshot {
        number: SnapshotNumber::from(number),
        utxo: utxo.clone(),
        confirmed: Vec::new(),
    };
    let signatures = aggregate_over(&snapshot);
    HeadState::Open {
        parameters: parameters(),
        coordinated: CoordinatedHeadState {
            seen_utxo: utxo,
            seen_txs: Vec::new(),
            confirmed_snapshot: ConfirmedSnapshot::Confirmed {
                snapshot,
                signatures,
            },
            seen_snapshot: SeenSnapshot::None,
        },
        previous: Box::new(HeadState::Idle),
    }
}

/// Aggregate signature of the full cast over a snapshot, in party order.
pub fn aggregate_over(snapshot: &Snapshot<SimpleTx>) -> MultiSignature {
    MultiSignature::aggregate(
        [alice(), bob(), carol()]
            .iter()
            .map(|sk| snapshot.sign(sk).expect("fixture snapshot signs"))
            .collect(),
    )
}

/// A well-formed acknowledgement of `snapshot` by the given signer.
pub fn ack_over(key: &SigningKey, snapshot: &Snapshot<SimpleTx>) -> Event<SimpleTx> {
    Event::network(Message::AckSn {
        from: party_of(key),
        signature: snapshot.sign(key).expect("fixture snapshot signs"),
        snapshot_number: snapshot.number,
    })
}

/// Step the reducer, expecting the state to advance.
pub fn advance(
    env: &Environment,
    state: HeadState<SimpleTx>,
    event: Event<SimpleTx>,
) -> (HeadState<SimpleTx>, Vec<Effect<SimpleTx>>) {
    match update(env, &SimpleLedger, &state, event) {
        Outcome::NewState { state, effects } => (state, effects),
        other => panic!("expected the state to advance, got {other:?}"),
    }
}

/// The confirmed snapshot number of an open head.
pub fn confirmed_number(state: &HeadState<SimpleTx>) -> u64 {
    match state {
        HeadState::Open { coordinated, .. } => coordinated.confirmed_snapshot.number().as_u64(),
        other => panic!("expected an open head, got {other:?}"),
    }
}

/// An initializing head with all commits still pending.
pub fn initial_head() -> HeadState<SimpleTx> {
    let params = parameters();
    HeadState::Initial {
        pending_commits: params.parties.iter().copied().collect(),
        committed: Default::default(),
        parameters: params,
        previous: Box::new(HeadState::Idle),
    }
}
