//! Ed25519 key and signature wrappers
//!
//! Byte-array wrappers around `ed25519-dalek` so that key material
//! serializes as hex strings and the rest of the workspace never touches
//! dalek types directly.

use crate::encoding::{hex_array, short_hex};
use crate::errors::MedusaError;
use ed25519_dalek::Signer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ed25519 signature wrapper (bytes form for serialization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "hex_array")] pub [u8; 64]);

impl Signature {
    /// Construct from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Convert to fixed-size array.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    /// Try to construct from a slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, MedusaError> {
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| MedusaError::crypto("Ed25519 signature must be exactly 64 bytes"))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig:{}", short_hex(&self.0))
    }
}

/// Ed25519 signing key wrapper.
///
/// Never crosses the wire; lives in the per-node `Environment` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey(#[serde(with = "hex_array")] [u8; 32]);

impl SigningKey {
    /// Construct a signing key from 32 seed bytes.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(seed)
    }

    /// Derive the matching verification key.
    pub fn verification_key(&self) -> VerificationKey {
        let key = ed25519_dalek::SigningKey::from_bytes(&self.0);
        VerificationKey(key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let key = ed25519_dalek::SigningKey::from_bytes(&self.0);
        Signature(key.sign(message).to_bytes())
    }
}

/// Ed25519 verification key wrapper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VerificationKey(#[serde(with = "hex_array")] pub [u8; 32]);

impl VerificationKey {
    /// Construct from raw bytes, checking that they form a valid curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, MedusaError> {
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(|_| Self(bytes))
            .map_err(|e| MedusaError::crypto(e.to_string()))
    }

    /// Convert to fixed-size array.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Verify a signature over a message.
    ///
    /// Returns `Ok(false)` for a well-formed but non-matching signature and
    /// `Err` only when the key bytes themselves are unusable.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool, MedusaError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| MedusaError::crypto(e.to_string()))?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        Ok(key.verify_strict(message, &sig).is_ok())
    }
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vk:{}", short_hex(&self.0))
    }
}
