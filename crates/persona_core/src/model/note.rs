//! Free-form note records (memories and journal entries).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable row identifier for a note entry.
pub type NoteId = i64;

/// Kind tag separating memories from journal entries.
///
/// Both share the same append-only lifecycle; the kind only scopes listing
/// and aggregation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Memory,
    Journal,
}

impl NoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Journal => "journal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memory" => Some(Self::Memory),
            "journal" => Some(Self::Journal),
            _ => None,
        }
    }
}

impl Display for NoteKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable note. No edits, no deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub id: NoteId,
    pub kind: NoteKind,
    pub text: String,
    /// Epoch milliseconds, non-decreasing with insertion order.
    pub created_at: i64,
}
