//! Snapshot engine
//!
//! Handles the three open-head network messages: `ReqTx` extends the seen
//! ledger, `ReqSn` starts a snapshot round, `AckSn` collects signatures
//! until the round confirms. Leader election is round-robin over the frozen
//! party order; only the leader of a snapshot number may request it.
//!
//! A malformed or wrong-key acknowledgement is dropped without an error
//! outcome so a byzantine peer cannot stall the round; the drop is visible
//! only as telemetry.

use crate::effects::{Effect, ServerOutput};
use crate::events::{Event, Message};
use crate::outcome::{Outcome, WaitReason};
use crate::state::{
    ConfirmedSnapshot, CoordinatedHeadState, HeadState, SeenSnapshot,
};
use medusa_core::{
    Environment, HeadParameters, Ledger, MultiSignature, Party, Signature, Snapshot,
    SnapshotNumber, Transaction,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Handle `ReqTx`: try to extend the seen ledger with one transaction.
///
/// When the transaction applies, the local node additionally requests the
/// next snapshot if it is that snapshot's leader and no round is in flight.
pub(crate) fn on_req_tx<T, L>(
    env: &Environment,
    ledger: &L,
    state: &HeadState<T>,
    transaction: T,
) -> Outcome<T>
where
    T: Transaction,
    L: Ledger<T>,
{
    let HeadState::Open {
        parameters,
        coordinated,
        previous,
    } = state
    else {
        return Outcome::invalid(
            Event::network(Message::ReqTx {
                from: env.party,
                transaction,
            }),
            state,
        );
    };

    let applied = ledger.apply_transactions(
        coordinated.seen_utxo.clone(),
        std::slice::from_ref(&transaction),
    );
    let seen_utxo = match applied {
        Ok(utxo) => utxo,
        Err(error) => {
            return Outcome::wait(WaitReason::WaitOnNotApplicableTx { error });
        }
    };

    let mut seen_txs = coordinated.seen_txs.clone();
    seen_txs.push(transaction);

    let next_number = coordinated.confirmed_snapshot.number().next();
    let no_round_in_flight = matches!(coordinated.seen_snapshot, SeenSnapshot::None);
    let mut effects = Vec::new();
    if parameters.leader(next_number) == Some(&env.party) && no_round_in_flight {
        effects.push(Effect::network(Message::ReqSn {
            from: env.party,
            snapshot_number: next_number,
            transactions: seen_txs.clone(),
        }));
    }

    Outcome::next(
        HeadState::Open {
            parameters: parameters.clone(),
            coordinated: CoordinatedHeadState {
                seen_utxo,
                seen_txs,
                confirmed_snapshot: coordinated.confirmed_snapshot.clone(),
                seen_snapshot: coordinated.seen_snapshot.clone(),
            },
            previous: previous.clone(),
        },
        effects,
    )
}

/// Handle `ReqSn`: validate a leader's snapshot request and acknowledge it.
///
/// Guard order matters; the first failing guard decides the outcome.
pub(crate) fn on_req_sn<T, L>(
    env: &Environment,
    ledger: &L,
    state: &HeadState<T>,
    from: Party,
    snapshot_number: SnapshotNumber,
    transactions: Vec<T>,
) -> Outcome<T>
where
    T: Transaction,
    L: Ledger<T>,
{
    let rebuild = |from, snapshot_number, transactions| {
        Event::network(Message::ReqSn {
            from,
            snapshot_number,
            transactions,
        })
    };

    let HeadState::Open {
        parameters,
        coordinated,
        previous,
    } = state
    else {
        return Outcome::invalid(rebuild(from, snapshot_number, transactions), state);
    };

    // Only the round-robin leader may originate this snapshot number.
    if parameters.leader(snapshot_number) != Some(&from) {
        return Outcome::invalid(rebuild(from, snapshot_number, transactions), state);
    }

    let confirmed_number = coordinated.confirmed_snapshot.number();
    if snapshot_number <= confirmed_number {
        return Outcome::invalid(rebuild(from, snapshot_number, transactions), state);
    }
    if snapshot_number > confirmed_number.next() {
        return Outcome::wait(WaitReason::WaitOnSeenSnapshot);
    }
    if let Some(in_flight) = coordinated.seen_snapshot.number() {
        if snapshot_number == in_flight {
            // Overlapping request for the round already in flight.
            return Outcome::invalid(rebuild(from, snapshot_number, transactions), state);
        }
        return Outcome::wait(WaitReason::WaitOnSnapshotNumber {
            snapshot_number: in_flight,
        });
    }

    let utxo = match ledger.apply_transactions(
        coordinated.confirmed_snapshot.utxo().clone(),
        &transactions,
    ) {
        Ok(utxo) => utxo,
        Err(error) => return Outcome::wait(WaitReason::WaitOnNotApplicableTx { error }),
    };

    let snapshot = Snapshot {
        number: snapshot_number,
        utxo,
        confirmed: transactions,
    };
    let own_signature = match snapshot.sign(&env.signing_key) {
        Ok(signature) => signature,
        Err(_) => return Outcome::require_failed("requested snapshot could not be signed"),
    };

    // Our own acknowledgement is not recorded here: the broadcast below is
    // delivered to every member including ourselves, so it enters the ack
    // map through the same `AckSn` path as everyone else's.
    Outcome::next(
        HeadState::Open {
            parameters: parameters.clone(),
            coordinated: CoordinatedHeadState {
                seen_utxo: coordinated.seen_utxo.clone(),
                seen_txs: coordinated.seen_txs.clone(),
                confirmed_snapshot: coordinated.confirmed_snapshot.clone(),
                seen_snapshot: SeenSnapshot::Seen {
                    snapshot,
                    acks: BTreeMap::new(),
                },
            },
            previous: previous.clone(),
        },
        vec![Effect::network(Message::AckSn {
            from: env.party,
            signature: own_signature,
            snapshot_number,
        })],
    )
}

/// Handle `AckSn`: collect one signature; confirm when all parties signed.
pub(crate) fn on_ack_sn<T, L>(
    env: &Environment,
    ledger: &L,
    state: &HeadState<T>,
    from: Party,
    signature: Signature,
    snapshot_number: SnapshotNumber,
) -> Outcome<T>
where
    T: Transaction,
    L: Ledger<T>,
{
    let HeadState::Open {
        parameters,
        coordinated,
        previous,
    } = state
    else {
        return Outcome::invalid(
            Event::network(Message::AckSn {
                from,
                signature,
                snapshot_number,
            }),
            state,
        );
    };

    let (snapshot, acks) = match &coordinated.seen_snapshot {
        SeenSnapshot::None => {
            if snapshot_number <= coordinated.confirmed_snapshot.number() {
                // Late duplicate for an already settled round.
                debug!(%from, %snapshot_number, "dropping acknowledgement for settled snapshot");
                return Outcome::unchanged(state);
            }
            return Outcome::wait(WaitReason::WaitOnSeenSnapshot);
        }
        SeenSnapshot::Seen { snapshot, acks } => {
            if snapshot_number < snapshot.number {
                debug!(%from, %snapshot_number, "dropping acknowledgement for stale snapshot");
                return Outcome::unchanged(state);
            }
            if snapshot_number > snapshot.number {
                return Outcome::wait(WaitReason::WaitOnSeenSnapshot);
            }
            (snapshot, acks)
        }
    };

    if !parameters.contains(&from) {
        warn!(%from, %snapshot_number, "dropping acknowledgement from non-member");
        return Outcome::unchanged(state);
    }
    match snapshot.verify(&from, &signature) {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            warn!(%from, %snapshot_number, "dropping acknowledgement with invalid signature");
            return Outcome::unchanged(state);
        }
    }

    let mut acks = acks.clone();
    acks.insert(from, signature);

    if !parameters.parties.iter().all(|p| acks.contains_key(p)) {
        return Outcome::next(
            HeadState::Open {
                parameters: parameters.clone(),
                coordinated: CoordinatedHeadState {
                    seen_utxo: coordinated.seen_utxo.clone(),
                    seen_txs: coordinated.seen_txs.clone(),
                    confirmed_snapshot: coordinated.confirmed_snapshot.clone(),
                    seen_snapshot: SeenSnapshot::Seen {
                        snapshot: snapshot.clone(),
                        acks,
                    },
                },
                previous: previous.clone(),
            },
            Vec::new(),
        );
    }

    confirm_snapshot(env, ledger, parameters, coordinated, previous, snapshot, &acks)
}

/// All parties signed: aggregate, confirm, and prune the seen ledger.
fn confirm_snapshot<T, L>(
    env: &Environment,
    ledger: &L,
    parameters: &HeadParameters,
    coordinated: &CoordinatedHeadState<T>,
    previous: &HeadState<T>,
    snapshot: &Snapshot<T>,
    acks: &BTreeMap<Party, Signature>,
) -> Outcome<T>
where
    T: Transaction,
    L: Ledger<T>,
{
    let components: Vec<Signature> = parameters
        .parties
        .iter()
        .filter_map(|p| acks.get(p).copied())
        .collect();
    let signatures = MultiSignature::aggregate(components);

    // Drop the freshly confirmed transactions from the seen set, then
    // rebuild the cache on top of the new confirmed UTxO. A seen
    // transaction that no longer applies is pruned: invariantly every
    // element of `seen_txs` applies cleanly in order.
    let confirmed_ids: BTreeSet<T::Id> = snapshot.confirmed.iter().map(|t| t.id()).collect();
    let mut seen_utxo = snapshot.utxo.clone();
    let mut seen_txs = Vec::with_capacity(coordinated.seen_txs.len());
    for tx in &coordinated.seen_txs {
        if confirmed_ids.contains(&tx.id()) {
            continue;
        }
        match ledger.apply_transactions(seen_utxo.clone(), std::slice::from_ref(tx)) {
            Ok(next) => {
                seen_utxo = next;
                seen_txs.push(tx.clone());
            }
            Err(error) => {
                debug!(tx = %tx.id(), %error, "pruning transaction obsoleted by confirmed snapshot");
            }
        }
    }

    let mut effects = vec![Effect::client(ServerOutput::SnapshotConfirmed {
        snapshot: snapshot.clone(),
        signatures: signatures.clone(),
    })];
    let next_number = snapshot.number.next();
    if parameters.leader(next_number) == Some(&env.party) && !seen_txs.is_empty() {
        effects.push(Effect::network(Message::ReqSn {
            from: env.party,
            snapshot_number: next_number,
            transactions: seen_txs.clone(),
        }));
    }

    Outcome::next(
        HeadState::Open {
            parameters: parameters.clone(),
            coordinated: CoordinatedHeadState {
                seen_utxo,
                seen_txs,
                confirmed_snapshot: ConfirmedSnapshot::Confirmed {
                    snapshot: snapshot.clone(),
                    signatures,
                },
                seen_snapshot: SeenSnapshot::None,
            },
            previous: Box::new(previous.clone()),
        },
        effects,
    )
}
