//! Deterministic actor fixtures
//!
//! The usual three-party cast with keys derived from fixed seeds, so every
//! test observes the same identities and the same leader rotation.

use medusa_core::{ContestationPeriod, Environment, HeadParameters, Party, SigningKey};

/// Alice's signing key (seed 0x01).
pub fn alice() -> SigningKey {
    SigningKey::from_seed([1u8; 32])
}

/// Bob's signing key (seed 0x02).
pub fn bob() -> SigningKey {
    SigningKey::from_seed([2u8; 32])
}

/// Carol's signing key (seed 0x03).
pub fn carol() -> SigningKey {
    SigningKey::from_seed([3u8; 32])
}

/// Head parameters for `[alice, bob, carol]` in that frozen order.
///
/// Alice leads snapshot 1, bob snapshot 2, carol snapshot 3.
pub fn three_party_parameters(contestation_period: ContestationPeriod) -> HeadParameters {
    let parties = vec![
        Party::new(alice().verification_key()),
        Party::new(bob().verification_key()),
        Party::new(carol().verification_key()),
    ];
    HeadParameters::new(contestation_period, parties)
        .unwrap_or_else(|e| panic!("fixture parameters must be valid: {e}"))
}

/// An environment for one member of the three-party cast.
pub fn three_party_environment(
    own_key: SigningKey,
    contestation_period: ContestationPeriod,
) -> Environment {
    let own_party = Party::new(own_key.verification_key());
    let others = [alice(), bob(), carol()]
        .into_iter()
        .map(|sk| Party::new(sk.verification_key()))
        .filter(|party| *party != own_party)
        .collect();
    Environment::new(own_key, others, contestation_period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medusa_core::SnapshotNumber;

    #[test]
    fn test_cast_is_distinct() {
        let parties = [alice(), bob(), carol()].map(|sk| Party::new(sk.verification_key()));
        assert_ne!(parties[0], parties[1]);
        assert_ne!(parties[1], parties[2]);
        assert_ne!(parties[0], parties[2]);
    }

    #[test]
    fn test_leader_rotation_starts_with_alice() {
        let params = three_party_parameters(ContestationPeriod::from_secs(42));
        let alice_party = Party::new(alice().verification_key());
        let bob_party = Party::new(bob().verification_key());

        assert_eq!(params.leader(SnapshotNumber::from(1)), Some(&alice_party));
        assert_eq!(params.leader(SnapshotNumber::from(2)), Some(&bob_party));
    }

    #[test]
    fn test_environment_contains_peers() {
        let env = three_party_environment(bob(), ContestationPeriod::from_secs(42));
        assert_eq!(env.other_parties.len(), 2);
        assert_eq!(env.all_parties().len(), 3);
    }
}
