//! A minimal deterministic ledger over numbered outputs
//!
//! Outputs are plain integers; a transaction consumes an exact set of live
//! outputs and produces fresh ones. Just enough ledger to exercise the
//! head logic: application either succeeds deterministically or fails with
//! a reason naming the offending transaction.

use medusa_core::{Ledger, Transaction, UTxOSet, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of numbered unspent outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimpleUtxo(pub BTreeSet<u64>);

impl SimpleUtxo {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from output numbers.
    pub fn from_outputs(outputs: impl IntoIterator<Item = u64>) -> Self {
        Self(outputs.into_iter().collect())
    }

    /// Whether the given output is live.
    pub fn contains(&self, output: u64) -> bool {
        self.0.contains(&output)
    }

    /// Number of live outputs.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl UTxOSet for SimpleUtxo {
    fn union(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A transaction consuming and producing numbered outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTx {
    /// Transaction identity.
    pub id: u64,
    /// Outputs this transaction consumes.
    pub inputs: SimpleUtxo,
    /// Outputs this transaction produces.
    pub outputs: SimpleUtxo,
}

impl SimpleTx {
    /// A transaction that consumes nothing and produces one output equal
    /// to its id. Handy when a test only needs *some* applicable tx.
    pub fn minting(id: u64) -> Self {
        Self {
            id,
            inputs: SimpleUtxo::new(),
            outputs: SimpleUtxo::from_outputs([id]),
        }
    }

    /// A transaction spending `inputs` into `outputs`.
    pub fn new(
        id: u64,
        inputs: impl IntoIterator<Item = u64>,
        outputs: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self {
            id,
            inputs: SimpleUtxo::from_outputs(inputs),
            outputs: SimpleUtxo::from_outputs(outputs),
        }
    }
}

impl Transaction for SimpleTx {
    type Id = u64;
    type UTxO = SimpleUtxo;

    fn id(&self) -> u64 {
        self.id
    }
}

/// The `Ledger` implementation over [`SimpleTx`].
#[derive(Debug, Clone, Default)]
pub struct SimpleLedger;

impl Ledger<SimpleTx> for SimpleLedger {
    fn init_utxo(&self) -> SimpleUtxo {
        SimpleUtxo::new()
    }

    fn apply_transactions(
        &self,
        utxo: SimpleUtxo,
        transactions: &[SimpleTx],
    ) -> Result<SimpleUtxo, ValidationError> {
        let mut live = utxo.0;
        for tx in transactions {
            for input in &tx.inputs.0 {
                if !live.remove(input) {
                    return Err(ValidationError::new(format!(
                        "tx {} consumes missing output {input}",
                        tx.id
                    )));
                }
            }
            for output in &tx.outputs.0 {
                if !live.insert(*output) {
                    return Err(ValidationError::new(format!(
                        "tx {} produces duplicate output {output}",
                        tx.id
                    )));
                }
            }
        }
        Ok(SimpleUtxo(live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_is_identity() {
        let utxo = SimpleUtxo::from_outputs([1, 2, 3]);
        let result = SimpleLedger
            .apply_transactions(utxo.clone(), &[])
            .expect("empty batch applies");
        assert_eq!(result, utxo);
    }

    #[test]
    fn test_spend_moves_outputs() {
        let utxo = SimpleUtxo::from_outputs([1, 2]);
        let tx = SimpleTx::new(10, [1], [3, 4]);
        let result = SimpleLedger
            .apply_transactions(utxo, &[tx])
            .expect("spend applies");
        assert_eq!(result, SimpleUtxo::from_outputs([2, 3, 4]));
    }

    #[test]
    fn test_missing_input_rejected() {
        let utxo = SimpleUtxo::from_outputs([1]);
        let tx = SimpleTx::new(10, [9], [3]);
        let err = SimpleLedger
            .apply_transactions(utxo, &[tx])
            .expect_err("missing input rejected");
        assert!(err.reason.contains("missing output 9"));
    }

    #[test]
    fn test_double_spend_within_batch_rejected() {
        let utxo = SimpleUtxo::from_outputs([1]);
        let txs = vec![SimpleTx::new(10, [1], [2]), SimpleTx::new(11, [1], [3])];
        assert!(SimpleLedger.apply_transactions(utxo, &txs).is_err());
    }

    #[test]
    fn test_application_is_order_sensitive() {
        let utxo = SimpleUtxo::from_outputs([1]);
        let spend_then_use = vec![SimpleTx::new(10, [1], [2]), SimpleTx::new(11, [2], [3])];
        let use_then_spend = vec![SimpleTx::new(11, [2], [3]), SimpleTx::new(10, [1], [2])];

        assert!(SimpleLedger
            .apply_transactions(utxo.clone(), &spend_then_use)
            .is_ok());
        assert!(SimpleLedger
            .apply_transactions(utxo, &use_then_spend)
            .is_err());
    }

    #[test]
    fn test_union_is_monoidal() {
        let a = SimpleUtxo::from_outputs([1, 2]);
        let b = SimpleUtxo::from_outputs([2, 3]);
        assert_eq!(
            a.clone().union(b.clone()),
            SimpleUtxo::from_outputs([1, 2, 3])
        );
        assert_eq!(a.clone().union(SimpleUtxo::new()), a);
        assert!(SimpleUtxo::new().is_empty());
    }
}
