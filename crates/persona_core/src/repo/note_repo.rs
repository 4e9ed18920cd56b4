//! Note log: contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append-only persistence of memory/journal entries.
//! - Ordered listing, optionally filtered by kind.
//!
//! # Invariants
//! - No edits, no deletes.
//! - `created_at` is clamped non-decreasing against the table maximum.
//! - Listing order is always `(created_at, id)`, oldest first.

use crate::model::note::{NoteEntry, NoteId, NoteKind};
use crate::repo::{RepoError, RepoResult};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT id, kind, text, created_at FROM notes";

/// Repository interface for the note log.
pub trait NoteRepository {
    /// Appends one note and returns its stable id.
    fn append(&self, kind: NoteKind, text: &str) -> RepoResult<NoteId>;
    /// Lists notes oldest first, optionally restricted to one kind.
    fn list(&self, kind: Option<NoteKind>) -> RepoResult<Vec<NoteEntry>>;
}

/// SQLite-backed note log.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn append(&self, kind: NoteKind, text: &str) -> RepoResult<NoteId> {
        self.conn.execute(
            "INSERT INTO notes (kind, text, created_at)
             SELECT ?1, ?2, MAX(?3, COALESCE((SELECT MAX(created_at) FROM notes), 0));",
            params![kind.as_str(), text, Utc::now().timestamp_millis()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list(&self, kind: Option<NoteKind>) -> RepoResult<Vec<NoteEntry>> {
        let mut sql = String::from(NOTE_SELECT_SQL);
        if kind.is_some() {
            sql.push_str(" WHERE kind = ?1");
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut notes = Vec::new();
        match kind {
            Some(kind) => {
                let mut rows = stmt.query([kind.as_str()])?;
                while let Some(row) = rows.next()? {
                    notes.push(parse_note_row(row)?);
                }
            }
            None => {
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    notes.push(parse_note_row(row)?);
                }
            }
        }

        Ok(notes)
    }
}

pub(crate) fn parse_note_row(row: &Row<'_>) -> RepoResult<NoteEntry> {
    let kind_text: String = row.get("kind")?;
    let kind = NoteKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid note kind `{kind_text}` in notes.kind"))
    })?;

    Ok(NoteEntry {
        id: row.get("id")?,
        kind,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}
