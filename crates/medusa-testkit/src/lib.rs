//! # Medusa Testkit
//!
//! Test support shared across the workspace: a minimal deterministic
//! ledger over numbered outputs and fixed keypair fixtures for the usual
//! three-party cast. Nothing here is protocol logic; production code never
//! depends on this crate.

#![forbid(unsafe_code)]

pub mod fixtures;
pub mod simple_ledger;

pub use fixtures::{alice, bob, carol, three_party_environment, three_party_parameters};
pub use simple_ledger::{SimpleLedger, SimpleTx, SimpleUtxo};
