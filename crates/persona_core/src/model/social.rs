//! Social ledger records: encounters, bonds, letters.
//!
//! # Responsibility
//! - Define one-sided relationship records keyed by a peer's card hash.
//!
//! # Invariants
//! - Nothing here implies anything about the peer's own store; every record
//!   is a local, directed observation.
//! - All three record types are append-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub type EncounterId = i64;
pub type BondId = i64;
pub type LetterId = i64;

/// The six recognized bond types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondType {
    Ally,
    Rival,
    Mentor,
    Muse,
    Kindred,
    Stranger,
}

/// All bond types in declaration order, used for help text and validation
/// messages.
pub const ALL_BOND_TYPES: [BondType; 6] = [
    BondType::Ally,
    BondType::Rival,
    BondType::Mentor,
    BondType::Muse,
    BondType::Kindred,
    BondType::Stranger,
];

impl BondType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ally => "ally",
            Self::Rival => "rival",
            Self::Mentor => "mentor",
            Self::Muse => "muse",
            Self::Kindred => "kindred",
            Self::Stranger => "stranger",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ally" => Some(Self::Ally),
            "rival" => Some(Self::Rival),
            "mentor" => Some(Self::Mentor),
            "muse" => Some(Self::Muse),
            "kindred" => Some(Self::Kindred),
            "stranger" => Some(Self::Stranger),
            _ => None,
        }
    }
}

impl Display for BondType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached observation of another identity's card at lookup time.
///
/// Repeat observations of the same peer are separate records; the ledger
/// preserves how a peer looked each time it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: EncounterId,
    pub peer_hash: String,
    pub peer_name: String,
    /// Peer field values as observed, keyed by field storage key.
    pub snapshot_fields: BTreeMap<String, String>,
    /// Epoch milliseconds.
    pub fetched_at: i64,
}

/// A local, one-sided relationship record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub id: BondId,
    pub peer_hash: String,
    pub bond_type: BondType,
    pub note: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// An outgoing message, persisted before and independent of any delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    pub id: LetterId,
    pub target_hash: String,
    pub message: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}
