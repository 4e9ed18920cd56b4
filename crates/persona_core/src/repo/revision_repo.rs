//! Field revision log: contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append-only persistence of (field, value, timestamp) triples.
//! - Ordered history reads, per field and across all fields.
//!
//! # Invariants
//! - Every change is a new append; re-setting a field to its current value
//!   still records a revision.
//! - `created_at` is clamped non-decreasing against the table maximum, so a
//!   backward wall-clock step never reorders the log.
//! - Ordering is always `(created_at, id)`, oldest first.

use crate::model::identity::{FieldName, FieldRevision, RevisionId};
use crate::repo::{RepoError, RepoResult};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

const REVISION_SELECT_SQL: &str = "SELECT id, field, value, created_at FROM field_revisions";

/// Repository interface for the revision log.
pub trait RevisionRepository {
    /// Appends one revision and returns its stable id.
    fn append(&self, field: FieldName, value: &str) -> RepoResult<RevisionId>;
    /// Full history of one field, oldest first. Empty if never set.
    fn history(&self, field: FieldName) -> RepoResult<Vec<FieldRevision>>;
    /// Every revision across all fields in timestamp order.
    fn all(&self) -> RepoResult<Vec<FieldRevision>>;
}

/// SQLite-backed revision log.
pub struct SqliteRevisionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRevisionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RevisionRepository for SqliteRevisionRepository<'_> {
    fn append(&self, field: FieldName, value: &str) -> RepoResult<RevisionId> {
        // Single INSERT so the append commits or rolls back as one unit; the
        // clamp keeps created_at non-decreasing with insertion order.
        self.conn.execute(
            "INSERT INTO field_revisions (field, value, created_at)
             SELECT ?1, ?2, MAX(?3, COALESCE((SELECT MAX(created_at) FROM field_revisions), 0));",
            params![field.as_str(), value, Utc::now().timestamp_millis()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn history(&self, field: FieldName) -> RepoResult<Vec<FieldRevision>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REVISION_SELECT_SQL}
             WHERE field = ?1
             ORDER BY created_at ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([field.as_str()])?;
        let mut revisions = Vec::new();
        while let Some(row) = rows.next()? {
            revisions.push(parse_revision_row(row)?);
        }

        Ok(revisions)
    }

    fn all(&self) -> RepoResult<Vec<FieldRevision>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVISION_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut revisions = Vec::new();
        while let Some(row) = rows.next()? {
            revisions.push(parse_revision_row(row)?);
        }

        Ok(revisions)
    }
}

pub(crate) fn parse_revision_row(row: &Row<'_>) -> RepoResult<FieldRevision> {
    let field_text: String = row.get("field")?;
    let field = FieldName::parse(&field_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid field name `{field_text}` in field_revisions.field"
        ))
    })?;

    Ok(FieldRevision {
        id: row.get("id")?,
        field,
        value: row.get("value")?,
        created_at: row.get("created_at")?,
    })
}
