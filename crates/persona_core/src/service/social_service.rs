//! Social ledger service: validated entry points over the social repository.
//!
//! # Responsibility
//! - Validate peer hashes and bond types at the string boundary.
//! - Pass validated input to the append-only social repository.
//!
//! # Invariants
//! - `UnknownBondType` and `InvalidPeerHash` are raised before any write.
//! - Nothing here performs network I/O; delivery and remote lookup are
//!   external collaborators that consume these records.

use crate::model::social::{
    Bond, BondId, BondType, Encounter, EncounterId, Letter, LetterId,
};
use crate::repo::social_repo::SocialRepository;
use crate::repo::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// Full 64-char SHA-256 hex or a shortened prefix of at least 8 chars.
static PEER_HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{8,64}$").expect("valid peer hash regex"));

/// Use-case service over the social ledger.
pub struct SocialService<R: SocialRepository> {
    repo: R,
}

impl<R: SocialRepository> SocialService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records one observation of a peer's card.
    pub fn record_encounter(
        &self,
        peer_hash: &str,
        peer_name: &str,
        fields: &BTreeMap<String, String>,
    ) -> RepoResult<EncounterId> {
        validate_peer_hash(peer_hash)?;
        self.repo.record_encounter(peer_hash, peer_name, fields)
    }

    /// Records a bond addressed by bond type string key.
    ///
    /// # Contract
    /// - `UnknownBondType` for a type outside the six recognized values.
    /// - Duplicate bonds are allowed and preserved.
    pub fn add_bond(
        &self,
        peer_hash: &str,
        bond_type: &str,
        note: Option<&str>,
    ) -> RepoResult<BondId> {
        validate_peer_hash(peer_hash)?;
        let bond_type = BondType::parse(bond_type)
            .ok_or_else(|| RepoError::UnknownBondType(bond_type.to_string()))?;
        self.repo.add_bond(peer_hash, bond_type, note)
    }

    /// Lists bonds most-recent-first.
    pub fn list_bonds(&self) -> RepoResult<Vec<Bond>> {
        self.repo.list_bonds()
    }

    /// Lists encounters most-recent-first.
    pub fn list_encounters(&self) -> RepoResult<Vec<Encounter>> {
        self.repo.list_encounters()
    }

    /// Resolves a peer from the local encounter cache.
    pub fn find_encounter(&self, query: &str) -> RepoResult<Option<Encounter>> {
        self.repo.find_encounter(query)
    }

    /// Persists an outgoing letter; delivery is a separate, external concern.
    pub fn record_letter(&self, target_hash: &str, message: &str) -> RepoResult<LetterId> {
        validate_peer_hash(target_hash)?;
        self.repo.record_letter(target_hash, message)
    }

    /// Lists outgoing letters most-recent-first.
    pub fn list_letters(&self) -> RepoResult<Vec<Letter>> {
        self.repo.list_letters()
    }
}

fn validate_peer_hash(value: &str) -> RepoResult<()> {
    if PEER_HASH_RE.is_match(value) {
        Ok(())
    } else {
        Err(RepoError::InvalidPeerHash(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_hash_accepts_short_and_full_hex() {
        assert!(validate_peer_hash("abc12345").is_ok());
        assert!(validate_peer_hash(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn peer_hash_rejects_bad_input() {
        assert!(validate_peer_hash("").is_err());
        assert!(validate_peer_hash("abc123").is_err());
        assert!(validate_peer_hash("ABC1234567").is_err());
        assert!(validate_peer_hash("xyz-not-hex!").is_err());
        assert!(validate_peer_hash(&"a".repeat(65)).is_err());
    }
}
