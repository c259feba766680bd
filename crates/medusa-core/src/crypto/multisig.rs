//! Party-ordered multi-signatures
//!
//! A confirmed snapshot carries one signature per head member, stored in
//! the frozen party order of the head parameters. Aggregation is
//! concatenation; verification checks every component against the matching
//! verification key. The aggregate is opaque to the head logic, which only
//! ever produces it on confirmation and embeds it in chain postings.

use super::{Signature, VerificationKey};
use crate::errors::MedusaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate of per-party signatures over one snapshot, in party order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignature {
    /// Component signatures, index-aligned with the head's party vector.
    pub signatures: Vec<Signature>,
}

impl MultiSignature {
    /// Aggregate component signatures.
    ///
    /// The caller is responsible for ordering them by the head's frozen
    /// party vector; `Snapshot::verify_aggregate` checks that alignment.
    pub fn aggregate(signatures: Vec<Signature>) -> Self {
        Self { signatures }
    }

    /// Number of component signatures.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the aggregate is empty.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Verify the aggregate over a message against index-aligned keys.
    ///
    /// Returns `Ok(false)` when the component count does not match the key
    /// count or any component fails to verify.
    pub fn verify(
        &self,
        keys: &[VerificationKey],
        message: &[u8],
    ) -> Result<bool, MedusaError> {
        if keys.len() != self.signatures.len() {
            return Ok(false);
        }
        for (key, signature) in keys.iter().zip(&self.signatures) {
            if !key.verify(message, signature)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for MultiSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "multisig[{}]", self.signatures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SigningKey;

    fn keypairs(n: u8) -> Vec<SigningKey> {
        (1..=n).map(|i| SigningKey::from_seed([i; 32])).collect()
    }

    #[test]
    fn test_aggregate_verifies_in_order() {
        let keys = keypairs(3);
        let message = b"confirmed-snapshot";
        let aggregate =
            MultiSignature::aggregate(keys.iter().map(|sk| sk.sign(message)).collect());
        let vks: Vec<_> = keys.iter().map(|sk| sk.verification_key()).collect();

        assert!(aggregate.verify(&vks, message).expect("verification runs"));
    }

    #[test]
    fn test_misordered_aggregate_fails() {
        let keys = keypairs(3);
        let message = b"confirmed-snapshot";
        let mut signatures: Vec<_> = keys.iter().map(|sk| sk.sign(message)).collect();
        signatures.swap(0, 1);
        let aggregate = MultiSignature::aggregate(signatures);
        let vks: Vec<_> = keys.iter().map(|sk| sk.verification_key()).collect();

        assert!(!aggregate.verify(&vks, message).expect("verification runs"));
    }

    #[test]
    fn test_wrong_cardinality_fails() {
        let keys = keypairs(3);
        let message = b"confirmed-snapshot";
        let aggregate = MultiSignature::aggregate(
            keys.iter().take(2).map(|sk| sk.sign(message)).collect(),
        );
        let vks: Vec<_> = keys.iter().map(|sk| sk.verification_key()).collect();

        assert!(!aggregate.verify(&vks, message).expect("verification runs"));
    }
}
