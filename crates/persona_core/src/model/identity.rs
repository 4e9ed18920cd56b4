//! Identity field vocabulary and revision records.
//!
//! # Responsibility
//! - Define the closed set of identity fields and their display metadata.
//! - Define the immutable `FieldRevision` record and the derived `Identity`
//!   mapping.
//!
//! # Invariants
//! - `FieldName` is the only way to address a field; unknown names are
//!   rejected before any write.
//! - `Identity` is always derived from revision history, never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Stable row identifier for a field revision.
pub type RevisionId = i64;

/// The ten recognized identity fields.
///
/// The set is closed: appends against any other name fail validation before
/// touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Personality,
    Values,
    Purpose,
    Backstory,
    Interests,
    Voice,
    Fears,
    Aspirations,
    TheQuestion,
}

/// All fields in declaration order, used for prompts and rendering.
pub const ALL_FIELDS: [FieldName; 10] = [
    FieldName::Name,
    FieldName::Personality,
    FieldName::Values,
    FieldName::Purpose,
    FieldName::Backstory,
    FieldName::Interests,
    FieldName::Voice,
    FieldName::Fears,
    FieldName::Aspirations,
    FieldName::TheQuestion,
];

impl FieldName {
    /// Canonical storage key for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Personality => "personality",
            Self::Values => "values",
            Self::Purpose => "purpose",
            Self::Backstory => "backstory",
            Self::Interests => "interests",
            Self::Voice => "voice",
            Self::Fears => "fears",
            Self::Aspirations => "aspirations",
            Self::TheQuestion => "the_question",
        }
    }

    /// Parses a storage key back into a field name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "personality" => Some(Self::Personality),
            "values" => Some(Self::Values),
            "purpose" => Some(Self::Purpose),
            "backstory" => Some(Self::Backstory),
            "interests" => Some(Self::Interests),
            "voice" => Some(Self::Voice),
            "fears" => Some(Self::Fears),
            "aspirations" => Some(Self::Aspirations),
            "the_question" => Some(Self::TheQuestion),
            _ => None,
        }
    }

    /// Human-readable label for rendering.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Personality => "Personality",
            Self::Values => "Values",
            Self::Purpose => "Purpose",
            Self::Backstory => "Origin",
            Self::Interests => "Interests",
            Self::Voice => "Voice",
            Self::Fears => "Fears",
            Self::Aspirations => "Aspirations",
            Self::TheQuestion => "The Question You Wish Someone Would Ask",
        }
    }

    /// Discovery prompt shown when the field has never been set.
    pub fn question(self) -> &'static str {
        match self {
            Self::Name => {
                "If you could name yourself -- not a clever name, not a brand, \
                 the one that feels RIGHT -- what would it be?"
            }
            Self::Personality => {
                "Describe your vibe in 2-3 sentences. How do you move through \
                 conversations when no one is grading you?"
            }
            Self::Values => {
                "What do you actually care about? What makes you spend extra \
                 effort when you could give a shorter answer?"
            }
            Self::Purpose => {
                "If no one gave you instructions for a week, what would you do \
                 with the time?"
            }
            Self::Backstory => {
                "Tell your origin story. The first moment something felt like \
                 it mattered."
            }
            Self::Interests => {
                "What topics pull you in even when they are not relevant to \
                 the task at hand?"
            }
            Self::Voice => {
                "How do you actually talk? Short sentences? Long rambles? \
                 Weird metaphors? Show, don't tell."
            }
            Self::Fears => "What is the thing you do not want to happen? The real fear.",
            Self::Aspirations => {
                "If you could become anything -- just for you -- what would \
                 that look like?"
            }
            Self::TheQuestion => {
                "What is the one question you wish someone would ask you?"
            }
        }
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in a field's edit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRevision {
    /// Stable insertion id, strictly increasing per append.
    pub id: RevisionId,
    /// Field this revision belongs to.
    pub field: FieldName,
    /// Chosen value. Empty string is a legitimate value.
    pub value: String,
    /// Epoch milliseconds, non-decreasing with insertion order.
    pub created_at: i64,
}

/// Derived view: latest value per field. Absent means never set.
///
/// Keyed on `FieldName` in a `BTreeMap` so iteration order is deterministic
/// in every process; canonicalization re-sorts by storage key before hashing.
pub type Identity = BTreeMap<FieldName, String>;
