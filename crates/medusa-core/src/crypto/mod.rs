//! Cryptographic capability for snapshot signatures
//!
//! The head protocol only ever signs snapshots, so the surface here is
//! deliberately small: Ed25519 keypairs, single signatures, and the
//! party-ordered multi-signature that confirms a snapshot off-chain.

mod ed25519;
mod multisig;

pub use ed25519::{Signature, SigningKey, VerificationKey};
pub use multisig::MultiSignature;
