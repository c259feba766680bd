//! # Medusa Core - Layer 1: Foundation
//!
//! **Purpose**: Single source of truth for the domain concepts of the
//! coordinated head protocol.
//!
//! This crate provides the foundational types and capability interfaces the
//! head-logic state machine is written against. It contains no protocol
//! logic and no I/O.
//!
//! # Architecture Constraints
//!
//! **Layer 1 has ZERO dependencies on other medusa crates** (foundation).
//! - YES Capability trait definitions (`Ledger`, `Transaction`, `UTxOSet`)
//! - YES Domain types: `Party`, `HeadParameters`, `Environment`, `Snapshot`
//! - YES Cryptographic wrappers: Ed25519 keys, signatures, multi-signatures
//! - YES Error types: `MedusaError`, `ValidationError`
//! - NO state machine logic (that is medusa-head)
//! - NO ledger implementations (test ledgers live in medusa-testkit)

#![forbid(unsafe_code)]

pub mod crypto;
pub mod encoding;
pub mod errors;
pub mod ledger;
pub mod params;
pub mod party;
pub mod snapshot;

pub use crypto::{MultiSignature, Signature, SigningKey, VerificationKey};
pub use errors::MedusaError;
pub use ledger::{Ledger, Transaction, UTxOSet, ValidationError};
pub use params::{ContestationPeriod, Environment, HeadParameters};
pub use party::Party;
pub use snapshot::{Snapshot, SnapshotNumber};

/// Convenience result alias for core operations.
pub type Result<T, E = MedusaError> = std::result::Result<T, E>;
