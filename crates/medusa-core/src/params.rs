//! Head parameters and per-node environment
//!
//! `HeadParameters` are frozen at head initialization and shared by every
//! member; the party vector's order drives leader election for the life of
//! the head. `Environment` is the per-node constant configuration the
//! reducer reads but never changes.

use crate::crypto::SigningKey;
use crate::errors::MedusaError;
use crate::party::Party;
use crate::snapshot::SnapshotNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The on-chain delay after close during which contesting is possible.
///
/// Second granularity matches the chain's slot resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContestationPeriod(u64);

impl ContestationPeriod {
    /// Construct from whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// The period in whole seconds.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// The period as a standard duration, for delay scheduling.
    pub fn to_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl fmt::Display for ContestationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Parameters fixed at head initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadParameters {
    /// Contestation window after a close transaction.
    pub contestation_period: ContestationPeriod,
    /// Head members in the frozen order used for leader election.
    pub parties: Vec<Party>,
}

impl HeadParameters {
    /// Create validated parameters.
    ///
    /// Requires at least one party and no duplicates; the given order is
    /// preserved and becomes authoritative.
    pub fn new(
        contestation_period: ContestationPeriod,
        parties: Vec<Party>,
    ) -> Result<Self, MedusaError> {
        if parties.is_empty() {
            return Err(MedusaError::invalid("head must have at least one party"));
        }
        let mut seen = std::collections::BTreeSet::new();
        for party in &parties {
            if !seen.insert(party) {
                return Err(MedusaError::invalid(format!("duplicate party {party}")));
            }
        }
        Ok(Self {
            contestation_period,
            parties,
        })
    }

    /// Number of head members.
    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    /// Whether the given party is a head member.
    pub fn contains(&self, party: &Party) -> bool {
        self.parties.contains(party)
    }

    /// The unique party entitled to request the given snapshot.
    ///
    /// Round-robin over the frozen party order; snapshot 0 is the initial
    /// snapshot and has no leader.
    pub fn leader(&self, snapshot_number: SnapshotNumber) -> Option<&Party> {
        let sn = snapshot_number.as_u64();
        if sn == 0 || self.parties.is_empty() {
            return None;
        }
        let index = ((sn - 1) % self.parties.len() as u64) as usize;
        self.parties.get(index)
    }
}

/// Per-node constant configuration.
///
/// Holds the node's own identity and signing key together with the peers it
/// expects to form heads with. The contestation period travels here so a
/// head can be initialized from a client `Init` command alone.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Our own party identity.
    pub party: Party,
    /// Key used to sign snapshot acknowledgements.
    pub signing_key: SigningKey,
    /// The other parties we form heads with.
    pub other_parties: Vec<Party>,
    /// Contestation period proposed when we initialize a head.
    pub contestation_period: ContestationPeriod,
}

impl Environment {
    /// Build an environment from a signing key and the expected peers.
    pub fn new(
        signing_key: SigningKey,
        other_parties: Vec<Party>,
        contestation_period: ContestationPeriod,
    ) -> Self {
        Self {
            party: Party::new(signing_key.verification_key()),
            signing_key,
            other_parties,
            contestation_period,
        }
    }

    /// All parties of the head this node would initialize, sorted by key so
    /// every member derives the same frozen order.
    pub fn all_parties(&self) -> Vec<Party> {
        let mut parties = self.other_parties.clone();
        parties.push(self.party);
        parties.sort();
        parties.dedup();
        parties
    }

    /// Head parameters for a head initialized by this node.
    pub fn head_parameters(&self) -> Result<HeadParameters, MedusaError> {
        HeadParameters::new(self.contestation_period, self.all_parties())
    }
}
