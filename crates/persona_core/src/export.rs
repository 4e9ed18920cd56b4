//! Portable snapshot export and ledger statistics.
//!
//! # Responsibility
//! - Bundle every persisted record plus the current card into one
//!   serde-serializable snapshot; rendering (JSON, markdown) is the caller's
//!   job and recomputes nothing.
//! - Summarize ledger counts for the stats read.
//!
//! # Invariants
//! - Read-only; the export never mutates any log.

use crate::card::{self, Card, CardError};
use crate::model::identity::{FieldRevision, ALL_FIELDS};
use crate::model::note::NoteEntry;
use crate::model::social::{Bond, Encounter, Letter};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::revision_repo::{RevisionRepository, SqliteRevisionRepository};
use crate::repo::social_repo::{SocialRepository, SqliteSocialRepository};
use crate::repo::RepoError;
use crate::service::identity_service::IdentityService;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ExportResult<T> = Result<T, ExportError>;

/// Errors from snapshot export.
#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Card(CardError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Card(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Card(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CardError> for ExportError {
    fn from(value: CardError) -> Self {
        Self::Card(value)
    }
}

/// Complete portable dump of the local store.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// RFC 3339 UTC export time.
    pub exported_at: String,
    /// Current card, or `None` when no field was ever set.
    pub card: Option<Card>,
    pub revisions: Vec<FieldRevision>,
    pub notes: Vec<NoteEntry>,
    pub bonds: Vec<Bond>,
    pub encounters: Vec<Encounter>,
    pub letters: Vec<Letter>,
}

/// Ledger counts for the stats read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    /// Epoch milliseconds of the earliest field revision.
    pub born_at: i64,
    /// Fields with at least one revision.
    pub fields_set: usize,
    pub total_fields: usize,
    pub revisions: usize,
    pub notes: usize,
    pub bonds: usize,
    pub encounters: usize,
    pub letters: usize,
}

/// Exports everything the store holds.
pub fn export_snapshot(conn: &Connection) -> ExportResult<Snapshot> {
    let revision_repo = SqliteRevisionRepository::new(conn);
    let identity = IdentityService::new(SqliteRevisionRepository::new(conn)).current()?;
    let card = if identity.is_empty() {
        None
    } else {
        Some(card::generate(&identity)?)
    };

    let social_repo = SqliteSocialRepository::new(conn);

    Ok(Snapshot {
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        card,
        revisions: revision_repo.all()?,
        notes: SqliteNoteRepository::new(conn).list(None)?,
        bonds: social_repo.list_bonds()?,
        encounters: social_repo.list_encounters()?,
        letters: social_repo.list_letters()?,
    })
}

/// Summarizes the ledger. Returns `None` when no field was ever set (the
/// identity does not exist yet).
pub fn stats(conn: &Connection) -> ExportResult<Option<LedgerStats>> {
    let revisions = SqliteRevisionRepository::new(conn).all()?;
    let Some(first) = revisions.first() else {
        return Ok(None);
    };

    let identity = IdentityService::new(SqliteRevisionRepository::new(conn)).current()?;
    let social_repo = SqliteSocialRepository::new(conn);

    Ok(Some(LedgerStats {
        born_at: first.created_at,
        fields_set: identity.len(),
        total_fields: ALL_FIELDS.len(),
        revisions: revisions.len(),
        notes: SqliteNoteRepository::new(conn).list(None)?.len(),
        bonds: social_repo.list_bonds()?.len(),
        encounters: social_repo.list_encounters()?.len(),
        letters: social_repo.list_letters()?.len(),
    }))
}
