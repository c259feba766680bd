//! Ledger capability
//!
//! The head logic is generic over the concrete ledger: it only needs to
//! apply transactions to a UTxO set and to distinguish success from a
//! validation failure. Implementations must be deterministic and
//! order-sensitive; applying an empty batch returns the input unchanged.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A monoidal set of unspent outputs.
///
/// `Default` is the empty set and `union` the monoid operation. The head
/// logic never inspects individual outputs.
pub trait UTxOSet:
    Clone + fmt::Debug + Default + PartialEq + Eq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Combine two UTxO sets.
    fn union(self, other: Self) -> Self;

    /// Whether the set holds no outputs.
    fn is_empty(&self) -> bool;
}

/// A transaction as far as the head logic is concerned: an identity plus
/// decidable equality. Everything else is the ledger's business.
pub trait Transaction:
    Clone + fmt::Debug + PartialEq + Eq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stable transaction identity, used to prune confirmed transactions
    /// from the locally seen set.
    type Id: Clone + fmt::Debug + fmt::Display + PartialEq + Eq + Hash + Ord + Serialize + DeserializeOwned + Send + Sync;

    /// The UTxO set type this transaction operates on.
    type UTxO: UTxOSet;

    /// This transaction's identity.
    fn id(&self) -> Self::Id;
}

/// Why a transaction batch does not apply to a UTxO set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("transaction not applicable: {reason}")]
pub struct ValidationError {
    /// Ledger-provided description of the failure.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The ledger capability the head logic runs against.
pub trait Ledger<T: Transaction>: Send + Sync {
    /// The UTxO set a head starts from before any commits are observed.
    fn init_utxo(&self) -> T::UTxO;

    /// Apply a batch of transactions in order.
    ///
    /// The first failing transaction aborts the batch; the input set is
    /// never partially consumed.
    fn apply_transactions(
        &self,
        utxo: T::UTxO,
        transactions: &[T],
    ) -> Result<T::UTxO, ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("input 3 already spent");
        assert_eq!(
            err.to_string(),
            "transaction not applicable: input 3 already spent"
        );
    }
}
