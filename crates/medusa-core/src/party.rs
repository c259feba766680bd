//! Party identity
//!
//! A party is identified by its snapshot verification key; there is no
//! separate naming layer. Ordering is byte order of the key, which gives
//! every node the same total order without coordination.

use crate::crypto::VerificationKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public identity of a head member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Party {
    /// The verification key that *is* this party's identity.
    pub verification_key: VerificationKey,
}

impl Party {
    /// Construct a party from its verification key.
    pub fn new(verification_key: VerificationKey) -> Self {
        Self { verification_key }
    }

    /// The key acknowledgement signatures are checked against.
    pub fn verification_key(&self) -> &VerificationKey {
        &self.verification_key
    }
}

impl From<VerificationKey> for Party {
    fn from(verification_key: VerificationKey) -> Self {
        Self { verification_key }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "party:{}", crate::encoding::short_hex(&self.verification_key.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SigningKey;

    #[test]
    fn test_party_is_its_key() {
        let sk = SigningKey::from_seed([5u8; 32]);
        let party = Party::new(sk.verification_key());
        assert_eq!(*party.verification_key(), sk.verification_key());
    }

    #[test]
    fn test_party_serializes_as_bare_key() {
        let sk = SigningKey::from_seed([5u8; 32]);
        let party = Party::new(sk.verification_key());
        let json = serde_json::to_string(&party).expect("serialize");
        // Transparent newtype: the wire form is just the hex key.
        assert!(json.starts_with('"') && json.ends_with('"'));
        let restored: Party = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, party);
    }
}
