//! Deterministic canonical serialization of an identity view.
//!
//! # Responsibility
//! - Produce the exact byte sequence that gets hashed into a card.
//!
//! # Invariants
//! - Keys are sorted by field storage key byte order (`BTreeMap`), never by
//!   in-memory layout or an unordered container.
//! - Absent fields are omitted entirely; an empty-string value is serialized,
//!   so unset and empty remain distinguishable after hashing.
//! - Output is identical across invocations and across processes.

use super::{CardError, CardResult};
use crate::model::identity::Identity;
use std::collections::BTreeMap;

/// Serializes the identity as compact JSON with sorted keys.
pub fn canonical_bytes(identity: &Identity) -> CardResult<Vec<u8>> {
    let sorted: BTreeMap<&str, &str> = identity
        .iter()
        .map(|(field, value)| (field.as_str(), value.as_str()))
        .collect();

    serde_json::to_vec(&sorted).map_err(CardError::Serialize)
}
