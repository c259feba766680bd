//! Snapshots and their canonical signed form
//!
//! A snapshot is a numbered summary of the head's UTxO set plus the
//! transactions it confirms. The signed message is the bincode encoding of
//! `(number, utxo, confirmed)`, which is deterministic for a fixed
//! transaction type, so all members agree on it bit-exactly.

use crate::crypto::{MultiSignature, Signature, SigningKey};
use crate::errors::MedusaError;
use crate::ledger::Transaction;
use crate::party::Party;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing snapshot sequence number within one head.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnapshotNumber(u64);

impl SnapshotNumber {
    /// The number of the initial snapshot.
    pub const GENESIS: SnapshotNumber = SnapshotNumber(0);

    /// Raw sequence number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The next snapshot number.
    pub fn next(&self) -> SnapshotNumber {
        SnapshotNumber(self.0 + 1)
    }
}

impl From<u64> for SnapshotNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SnapshotNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sn{}", self.0)
    }
}

/// A numbered summary of the head state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "T: Transaction")]
pub struct Snapshot<T: Transaction> {
    /// Sequence number; strictly increases across confirmed snapshots.
    pub number: SnapshotNumber,
    /// The UTxO set after applying `confirmed` to the previous snapshot.
    pub utxo: T::UTxO,
    /// Transactions this snapshot confirms, in application order.
    pub confirmed: Vec<T>,
}

impl<T: Transaction> Snapshot<T> {
    /// The initial snapshot: number 0, the opening UTxO, no transactions.
    pub fn genesis(utxo: T::UTxO) -> Self {
        Self {
            number: SnapshotNumber::GENESIS,
            utxo,
            confirmed: Vec::new(),
        }
    }

    /// Canonical byte encoding of the signed message.
    pub fn signable_bytes(&self) -> Result<Vec<u8>, MedusaError> {
        bincode::serialize(&(self.number, &self.utxo, &self.confirmed))
            .map_err(|e| MedusaError::serialization(e.to_string()))
    }

    /// Sign this snapshot.
    pub fn sign(&self, key: &SigningKey) -> Result<Signature, MedusaError> {
        Ok(key.sign(&self.signable_bytes()?))
    }

    /// Verify a single party's acknowledgement signature.
    pub fn verify(&self, party: &Party, signature: &Signature) -> Result<bool, MedusaError> {
        party
            .verification_key()
            .verify(&self.signable_bytes()?, signature)
    }

    /// Verify an aggregate signature against the full party vector.
    pub fn verify_aggregate(
        &self,
        parties: &[Party],
        aggregate: &MultiSignature,
    ) -> Result<bool, MedusaError> {
        let keys: Vec<_> = parties.iter().map(|p| *p.verification_key()).collect();
        aggregate.verify(&keys, &self.signable_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::UTxOSet;
    use std::collections::BTreeSet;

    // A tiny stand-in transaction; the real test ledger lives in
    // medusa-testkit, which this crate cannot depend on.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct TestTx(u64);

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    struct TestUtxo(BTreeSet<u64>);

    impl UTxOSet for TestUtxo {
        fn union(mut self, other: Self) -> Self {
            self.0.extend(other.0);
            self
        }

        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    impl Transaction for TestTx {
        type Id = u64;
        type UTxO = TestUtxo;

        fn id(&self) -> u64 {
            self.0
        }
    }

    fn snapshot(number: u64) -> Snapshot<TestTx> {
        Snapshot {
            number: SnapshotNumber::from(number),
            utxo: TestUtxo(BTreeSet::from([1, 2, 3])),
            confirmed: vec![TestTx(7)],
        }
    }

    #[test]
    fn test_signable_bytes_are_deterministic() {
        let a = snapshot(1).signable_bytes().expect("encode");
        let b = snapshot(1).signable_bytes().expect("encode");
        assert_eq!(a, b);
        assert_ne!(a, snapshot(2).signable_bytes().expect("encode"));
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let sk = SigningKey::from_seed([9u8; 32]);
        let party = Party::new(sk.verification_key());
        let snap = snapshot(1);

        let signature = snap.sign(&sk).expect("sign");
        assert!(snap.verify(&party, &signature).expect("verify"));
        assert!(!snapshot(2).verify(&party, &signature).expect("verify"));
    }

    #[test]
    fn test_aggregate_over_all_parties() {
        let keys: Vec<_> = (1u8..=3).map(|i| SigningKey::from_seed([i; 32])).collect();
        let parties: Vec<_> = keys
            .iter()
            .map(|sk| Party::new(sk.verification_key()))
            .collect();
        let snap = snapshot(4);

        let aggregate = MultiSignature::aggregate(
            keys.iter()
                .map(|sk| snap.sign(sk).expect("sign"))
                .collect(),
        );
        assert!(snap
            .verify_aggregate(&parties, &aggregate)
            .expect("verify aggregate"));
    }
}
