//! The reducer
//!
//! `update` classifies one event against the current head state and
//! produces exactly one outcome. Connectivity notifications, rollbacks and
//! chain ticks are state-independent and handled first; everything else
//! dispatches on the state tag. Events that are not meaningful for the
//! current state are rejected as `InvalidEvent`, as opposed to `Wait`,
//! which asks the runtime to re-deliver.

use crate::effects::{Effect, PostChainTx, ServerOutput};
use crate::events::{ChainEvent, ClientCommand, Event, Message, OnChainTx};
use crate::outcome::{Outcome, WaitReason};
use crate::snapshots;
use crate::state::{CoordinatedHeadState, HeadState};
use medusa_core::{Environment, Ledger, Party, Transaction, UTxOSet};
use std::collections::{BTreeMap, BTreeSet};

/// Advance the head-logic state machine by one event.
///
/// Pure and total: no I/O, no mutation of inputs, deterministic outcome
/// and effect order for identical inputs.
pub fn update<T, L>(
    env: &Environment,
    ledger: &L,
    state: &HeadState<T>,
    event: Event<T>,
) -> Outcome<T>
where
    T: Transaction,
    L: Ledger<T>,
{
    // State-independent events first.
    let event = match event {
        Event::Network {
            message: Message::Connected { host },
        } => {
            return Outcome::next(
                state.clone(),
                vec![Effect::client(ServerOutput::PeerConnected { host })],
            );
        }
        Event::Network {
            message: Message::Disconnected { host },
        } => {
            return Outcome::next(
                state.clone(),
                vec![Effect::client(ServerOutput::PeerDisconnected { host })],
            );
        }
        Event::Chain {
            event: ChainEvent::Rollback { depth },
        } => {
            return Outcome::next(
                state.clone().rollback(depth),
                vec![Effect::client(ServerOutput::RolledBack)],
            );
        }
        Event::Chain {
            event: ChainEvent::Tick { .. },
        } => {
            // Chain time does not drive this state machine; deadlines are
            // scheduled through Delay effects instead.
            return Outcome::unchanged(state);
        }
        other => other,
    };

    match state {
        HeadState::Idle => on_idle(env, state, event),
        HeadState::Initial { .. } => on_initial(env, state, event),
        HeadState::Open { .. } => on_open(env, ledger, state, event),
        HeadState::Closed { .. } => on_closed(state, event),
        HeadState::Final => Outcome::invalid(event, state),
    }
}

/// Idle: a head can be initialized locally or observed on chain.
fn on_idle<T: Transaction>(
    env: &Environment,
    state: &HeadState<T>,
    event: Event<T>,
) -> Outcome<T> {
    match event {
        Event::Client {
            command: ClientCommand::Init,
        } => match env.head_parameters() {
            Ok(parameters) => Outcome::next(
                state.clone(),
                vec![Effect::chain(PostChainTx::InitTx { parameters })],
            ),
            Err(_) => Outcome::require_failed("local configuration forms no valid head"),
        },
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx: OnChainTx::OnInitTx { parameters },
                },
        } => {
            let ours: BTreeSet<Party> = env.all_parties().into_iter().collect();
            let theirs: BTreeSet<Party> = parameters.parties.iter().copied().collect();
            if ours != theirs {
                return Outcome::not_our_head();
            }
            let parties = parameters.parties.clone();
            Outcome::next(
                HeadState::Initial {
                    pending_commits: theirs,
                    committed: BTreeMap::new(),
                    parameters,
                    previous: Box::new(HeadState::Idle),
                },
                vec![Effect::client(ServerOutput::HeadIsInitializing { parties })],
            )
        }
        other => Outcome::invalid(other, state),
    }
}

/// Initial: collect commits until the head can be opened, or abort.
fn on_initial<T: Transaction>(
    env: &Environment,
    state: &HeadState<T>,
    event: Event<T>,
) -> Outcome<T> {
    let HeadState::Initial {
        parameters,
        pending_commits,
        committed,
        ..
    } = state
    else {
        return Outcome::invalid(event, state);
    };

    match event {
        Event::Client {
            command: ClientCommand::Commit { utxo },
        } => {
            if !pending_commits.contains(&env.party) {
                return Outcome::invalid(
                    Event::client(ClientCommand::Commit { utxo }),
                    state,
                );
            }
            Outcome::next(
                state.clone(),
                vec![Effect::chain(PostChainTx::CommitTx {
                    party: env.party,
                    utxo,
                })],
            )
        }
        Event::Client {
            command: ClientCommand::Abort,
        } => Outcome::next(state.clone(), vec![Effect::chain(PostChainTx::AbortTx)]),
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx: OnChainTx::OnCommitTx { party, utxo },
                },
        } => {
            if !pending_commits.contains(&party) {
                // Duplicate observation or a commit from a non-member.
                return Outcome::invalid(
                    Event::observation(OnChainTx::OnCommitTx { party, utxo }),
                    state,
                );
            }
            let mut pending_commits = pending_commits.clone();
            pending_commits.remove(&party);
            let mut committed = committed.clone();
            committed.insert(party, utxo);

            let effects = if pending_commits.is_empty() {
                vec![Effect::chain(PostChainTx::CollectComTx)]
            } else {
                Vec::new()
            };
            Outcome::next(
                HeadState::Initial {
                    parameters: parameters.clone(),
                    pending_commits,
                    committed,
                    previous: Box::new(state.clone()),
                },
                effects,
            )
        }
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx: OnChainTx::OnCollectComTx,
                },
        } => {
            let opening = combined_utxo::<T>(committed);
            Outcome::next(
                HeadState::Open {
                    parameters: parameters.clone(),
                    coordinated: CoordinatedHeadState::new(opening.clone()),
                    previous: Box::new(state.clone()),
                },
                vec![Effect::client(ServerOutput::HeadIsOpen { utxo: opening })],
            )
        }
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx: OnChainTx::OnAbortTx,
                },
        } => Outcome::next(
            HeadState::Final,
            vec![Effect::client(ServerOutput::HeadIsAborted {
                utxo: combined_utxo::<T>(committed),
            })],
        ),
        other => Outcome::invalid(other, state),
    }
}

/// Open: the snapshot engine runs; the head can be closed.
fn on_open<T, L>(
    env: &Environment,
    ledger: &L,
    state: &HeadState<T>,
    event: Event<T>,
) -> Outcome<T>
where
    T: Transaction,
    L: Ledger<T>,
{
    let HeadState::Open {
        parameters,
        coordinated,
        ..
    } = state
    else {
        return Outcome::invalid(event, state);
    };

    match event {
        Event::Client {
            command: ClientCommand::NewTx { transaction },
        } => {
            // Broadcast the request and route it locally in one step.
            match snapshots::on_req_tx(env, ledger, state, transaction.clone()) {
                Outcome::NewState {
                    state,
                    mut effects,
                } => {
                    effects.insert(
                        0,
                        Effect::network(Message::ReqTx {
                            from: env.party,
                            transaction,
                        }),
                    );
                    Outcome::NewState { state, effects }
                }
                other => other,
            }
        }
        Event::Network {
            message: Message::ReqTx { transaction, .. },
        } => snapshots::on_req_tx(env, ledger, state, transaction),
        Event::Network {
            message:
                Message::ReqSn {
                    from,
                    snapshot_number,
                    transactions,
                },
        } => snapshots::on_req_sn(env, ledger, state, from, snapshot_number, transactions),
        Event::Network {
            message:
                Message::AckSn {
                    from,
                    signature,
                    snapshot_number,
                },
        } => snapshots::on_ack_sn(env, ledger, state, from, signature, snapshot_number),
        Event::Client {
            command: ClientCommand::Close,
        } => Outcome::next(
            state.clone(),
            vec![Effect::chain(PostChainTx::CloseTx {
                confirmed_snapshot: coordinated.confirmed_snapshot.clone(),
            })],
        ),
        Event::Client {
            command: ClientCommand::GetUTxO,
        } => Outcome::next(
            state.clone(),
            vec![Effect::client(ServerOutput::UTxO {
                utxo: coordinated.seen_utxo.clone(),
            })],
        ),
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx:
                        OnChainTx::OnCloseTx {
                            snapshot_number,
                            contestation_deadline_ms,
                        },
                },
        } => {
            let confirmed_snapshot = coordinated.confirmed_snapshot.clone();
            let mut effects = vec![Effect::client(ServerOutput::HeadIsClosed {
                snapshot_number,
                contestation_deadline_ms,
            })];
            if snapshot_number < confirmed_snapshot.number() {
                // The close used a stale snapshot: contest with ours.
                effects.push(Effect::chain(PostChainTx::ContestTx {
                    confirmed_snapshot: confirmed_snapshot.clone(),
                }));
            }
            effects.push(Effect::delay(
                parameters.contestation_period.to_duration(),
                WaitReason::WaitOnContestationPeriod,
                Event::ShouldPostFanout,
            ));
            Outcome::next(
                HeadState::Closed {
                    parameters: parameters.clone(),
                    confirmed_snapshot,
                    previous: Box::new(state.clone()),
                },
                effects,
            )
        }
        other => Outcome::invalid(other, state),
    }
}

/// Closed: contest if needed, then fan out after the contestation window.
fn on_closed<T: Transaction>(state: &HeadState<T>, event: Event<T>) -> Outcome<T> {
    let HeadState::Closed {
        confirmed_snapshot, ..
    } = state
    else {
        return Outcome::invalid(event, state);
    };

    match event {
        Event::Client {
            command: ClientCommand::Contest,
        } => Outcome::next(
            state.clone(),
            vec![Effect::chain(PostChainTx::ContestTx {
                confirmed_snapshot: confirmed_snapshot.clone(),
            })],
        ),
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx: OnChainTx::OnContestTx { snapshot_number },
                },
        } => {
            if snapshot_number < confirmed_snapshot.number() {
                Outcome::next(
                    state.clone(),
                    vec![Effect::chain(PostChainTx::ContestTx {
                        confirmed_snapshot: confirmed_snapshot.clone(),
                    })],
                )
            } else {
                Outcome::unchanged(state)
            }
        }
        Event::ShouldPostFanout => Outcome::next(
            state.clone(),
            vec![Effect::chain(PostChainTx::FanoutTx {
                confirmed_snapshot: confirmed_snapshot.clone(),
            })],
        ),
        Event::Chain {
            event:
                ChainEvent::Observation {
                    tx: OnChainTx::OnFanoutTx,
                },
        } => Outcome::next(
            HeadState::Final,
            vec![Effect::client(ServerOutput::HeadIsFinalized {
                utxo: confirmed_snapshot.utxo().clone(),
            })],
        ),
        other => Outcome::invalid(other, state),
    }
}

/// Fold the committed UTxO sets into the head's opening set.
fn combined_utxo<T: Transaction>(committed: &BTreeMap<Party, T::UTxO>) -> T::UTxO {
    committed
        .values()
        .cloned()
        .fold(T::UTxO::default(), |acc, utxo| acc.union(utxo))
}
