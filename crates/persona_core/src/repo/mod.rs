//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts over the append-only
//!   ledger tables.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories only ever append; there is no update or delete path.
//! - Read paths reject invalid persisted state (`InvalidData`) instead of
//!   masking it with defaults.

use crate::db::DbError;
use crate::model::identity::FieldName;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;
pub mod revision_repo;
pub mod social_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Semantic and transport errors shared by the ledger repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Field name is not one of the ten recognized keys.
    InvalidField(String),
    /// Bond type is not one of the six recognized values.
    UnknownBondType(String),
    /// Peer hash is not lowercase hex of plausible digest length.
    InvalidPeerHash(String),
    /// Diff requested on a field with fewer than two revisions.
    NoHistory(FieldName),
    /// Storage transport failure (`DbError::Busy` is retryable, the rest are
    /// fatal for the invoking operation).
    Db(DbError),
    /// Persisted row violates the model; reported verbatim, never defaulted.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField(name) => write!(f, "unknown identity field: `{name}`"),
            Self::UnknownBondType(value) => write!(f, "unknown bond type: `{value}`"),
            Self::InvalidPeerHash(value) => write!(f, "invalid peer hash: `{value}`"),
            Self::NoHistory(field) => {
                write!(f, "field `{field}` has fewer than two revisions; nothing to diff")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}
