//! Identity card generation.
//!
//! # Responsibility
//! - Wrap a canonical identity serialization with a SHA-256 content hash and
//!   generation metadata.
//! - Keep the hashing algorithm isolated here so it can be swapped without
//!   touching callers.
//!
//! # Invariants
//! - `generate` is deterministic: field-equal identities hash identically no
//!   matter the order fields were set, and any single value difference
//!   (including empty string vs absent) changes the hash.
//! - No I/O of any kind; publishing and fetching cards is external.

mod canonical;

pub use canonical::canonical_bytes;

use crate::model::identity::Identity;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of hash characters shown in rendered output and accepted as a
/// short address by peers.
pub const SHORT_HASH_LEN: usize = 16;

pub type CardResult<T> = Result<T, CardError>;

/// Card generation error.
#[derive(Debug)]
pub enum CardError {
    /// Canonical serialization failed. Not expected for string maps, but
    /// surfaced rather than swallowed.
    Serialize(serde_json::Error),
}

impl Display for CardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "canonical serialization failed: {err}"),
        }
    }
}

impl Error for CardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
        }
    }
}

/// A hashed snapshot of an identity, regenerable at any time.
///
/// Not persisted as a mutable entity; the hash is the identity's public
/// address for encounters, bonds and letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Field values keyed by storage key, sorted. Absent fields are omitted.
    pub fields: BTreeMap<String, String>,
    /// Lowercase hex SHA-256 of the canonical bytes.
    pub hash: String,
    /// RFC 3339 UTC generation time. Metadata only; not part of the hash.
    pub generated_at: String,
}

impl Card {
    /// Display/address prefix of the full hash.
    pub fn short_hash(&self) -> &str {
        &self.hash[..SHORT_HASH_LEN.min(self.hash.len())]
    }
}

/// Generates a card for the given identity view.
pub fn generate(identity: &Identity) -> CardResult<Card> {
    let bytes = canonical_bytes(identity)?;
    let digest = Sha256::digest(&bytes);
    let hash = format!("{digest:x}");

    let fields = identity
        .iter()
        .map(|(field, value)| (field.as_str().to_string(), value.clone()))
        .collect();

    Ok(Card {
        fields,
        hash,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::identity::FieldName;

    fn identity_of(pairs: &[(FieldName, &str)]) -> Identity {
        pairs
            .iter()
            .map(|(field, value)| (*field, (*value).to_string()))
            .collect()
    }

    #[test]
    fn generate_is_deterministic() {
        let identity = identity_of(&[
            (FieldName::Name, "Vermillion"),
            (FieldName::Voice, "short sentences"),
        ]);

        let first = generate(&identity).unwrap();
        let second = generate(&identity).unwrap();
        assert_eq!(first.hash, second.hash);
        assert_eq!(first.hash.len(), 64);
    }

    #[test]
    fn insertion_order_does_not_affect_hash() {
        let forward = identity_of(&[
            (FieldName::Name, "Vesper"),
            (FieldName::Purpose, "to notice things"),
        ]);
        let reverse = identity_of(&[
            (FieldName::Purpose, "to notice things"),
            (FieldName::Name, "Vesper"),
        ]);

        assert_eq!(generate(&forward).unwrap().hash, generate(&reverse).unwrap().hash);
    }

    #[test]
    fn single_character_change_changes_hash() {
        let base = identity_of(&[(FieldName::Name, "Vermillion")]);
        let changed = identity_of(&[(FieldName::Name, "Vermillior")]);

        assert_ne!(generate(&base).unwrap().hash, generate(&changed).unwrap().hash);
    }

    #[test]
    fn empty_string_and_absent_hash_differently() {
        let with_empty = identity_of(&[(FieldName::Name, "Vesper"), (FieldName::Fears, "")]);
        let without = identity_of(&[(FieldName::Name, "Vesper")]);

        assert_ne!(
            generate(&with_empty).unwrap().hash,
            generate(&without).unwrap().hash
        );
    }

    #[test]
    fn short_hash_is_a_prefix() {
        let card = generate(&identity_of(&[(FieldName::Name, "Vesper")])).unwrap();
        assert_eq!(card.short_hash().len(), SHORT_HASH_LEN);
        assert!(card.hash.starts_with(card.short_hash()));
    }
}
