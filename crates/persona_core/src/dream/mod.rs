//! Dream aggregation: a merged view across all ledger logs.
//!
//! # Responsibility
//! - Combine field revisions, notes, and bonds into one timestamp-ordered
//!   sequence, optionally deduplicated.
//!
//! # Invariants
//! - Source logs are never mutated; deduplication only shapes the view.
//! - Timestamp ties break by fixed precedence: revision, then note, then
//!   bond, then per-table insertion id.
//! - `deep = true` returns every record; `deep = false` collapses entries
//!   with an identical semantic key to their most recent occurrence without
//!   reordering what remains.

use crate::model::identity::FieldRevision;
use crate::model::note::NoteEntry;
use crate::model::social::Bond;
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::revision_repo::{RevisionRepository, SqliteRevisionRepository};
use crate::repo::social_repo::{SocialRepository, SqliteSocialRepository};
use crate::repo::RepoResult;
use rusqlite::Connection;
use std::collections::HashSet;

/// One entry in the aggregated view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DreamEntry {
    Revision(FieldRevision),
    Note(NoteEntry),
    Bond(Bond),
}

impl DreamEntry {
    /// Epoch milliseconds of the underlying record.
    pub fn created_at(&self) -> i64 {
        match self {
            Self::Revision(revision) => revision.created_at,
            Self::Note(note) => note.created_at,
            Self::Bond(bond) => bond.created_at,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Revision(_) => 0,
            Self::Note(_) => 1,
            Self::Bond(_) => 2,
        }
    }

    fn insertion_id(&self) -> i64 {
        match self {
            Self::Revision(revision) => revision.id,
            Self::Note(note) => note.id,
            Self::Bond(bond) => bond.id,
        }
    }

    /// Semantic identity used by the deduplication pass.
    fn dedup_key(&self) -> (u8, String, String) {
        match self {
            Self::Revision(revision) => (
                0,
                revision.field.as_str().to_string(),
                revision.value.clone(),
            ),
            Self::Note(note) => (1, note.kind.as_str().to_string(), note.text.clone()),
            Self::Bond(bond) => (
                2,
                format!("{}:{}", bond.peer_hash, bond.bond_type),
                bond.note.clone().unwrap_or_default(),
            ),
        }
    }
}

/// Builds the aggregated view over the given store.
///
/// # Contract
/// - Read-only; runs entirely on the store's native read consistency.
/// - Output is ordered by `(created_at, precedence, id)`.
pub fn aggregate(conn: &Connection, deep: bool) -> RepoResult<Vec<DreamEntry>> {
    let mut entries = Vec::new();

    for revision in SqliteRevisionRepository::new(conn).all()? {
        entries.push(DreamEntry::Revision(revision));
    }
    for note in SqliteNoteRepository::new(conn).list(None)? {
        entries.push(DreamEntry::Note(note));
    }
    let mut bonds = SqliteSocialRepository::new(conn).list_bonds()?;
    // list_bonds is most-recent-first; the merge wants oldest first.
    bonds.reverse();
    for bond in bonds {
        entries.push(DreamEntry::Bond(bond));
    }

    entries.sort_by_key(|entry| (entry.created_at(), entry.precedence(), entry.insertion_id()));

    if deep {
        return Ok(entries);
    }

    Ok(collapse_repeats(entries))
}

/// Keeps only the most recent occurrence of each semantic key, preserving
/// the timestamp order of what remains.
fn collapse_repeats(entries: Vec<DreamEntry>) -> Vec<DreamEntry> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());

    for entry in entries.into_iter().rev() {
        if seen.insert(entry.dedup_key()) {
            kept.push(entry);
        }
    }

    kept.reverse();
    kept
}
