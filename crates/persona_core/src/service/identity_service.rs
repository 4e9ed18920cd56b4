//! Identity view service: derived state over the revision log.
//!
//! # Responsibility
//! - Fold revision history into current and point-in-time identity views.
//! - Provide diff and timeline reads.
//!
//! # Invariants
//! - Every view is a pure read over history; nothing here caches "current
//!   value" as mutable state.
//! - `diff` requires at least two revisions; single-revision fields surface
//!   `NoHistory`, never a synthetic diff.

use crate::model::identity::{FieldName, FieldRevision, Identity, RevisionId, ALL_FIELDS};
use crate::repo::revision_repo::RevisionRepository;
use crate::repo::{RepoError, RepoResult};
use std::collections::BTreeMap;

/// Use-case service over the revision log.
pub struct IdentityService<R: RevisionRepository> {
    repo: R,
}

impl<R: RevisionRepository> IdentityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a revision for a field addressed by its string key.
    ///
    /// # Contract
    /// - `InvalidField` for a key outside the ten recognized names, before
    ///   any write.
    /// - Empty values are accepted; append-always, even for unchanged values.
    pub fn set_field(&self, key: &str, value: &str) -> RepoResult<RevisionId> {
        let field =
            FieldName::parse(key).ok_or_else(|| RepoError::InvalidField(key.to_string()))?;
        self.set(field, value)
    }

    /// Appends a revision for an already-typed field.
    pub fn set(&self, field: FieldName, value: &str) -> RepoResult<RevisionId> {
        self.repo.append(field, value)
    }

    /// Full history of one field, oldest first.
    pub fn history(&self, field: FieldName) -> RepoResult<Vec<FieldRevision>> {
        self.repo.history(field)
    }

    /// Latest value per field. Fields never set are absent.
    pub fn current(&self) -> RepoResult<Identity> {
        let mut identity = Identity::new();
        for revision in self.repo.all()? {
            identity.insert(revision.field, revision.value);
        }
        Ok(identity)
    }

    /// Identity as it stood at the given timestamp: latest revision with
    /// `created_at <= timestamp` per field.
    pub fn as_of(&self, timestamp: i64) -> RepoResult<Identity> {
        let mut identity = Identity::new();
        for revision in self.repo.all()? {
            if revision.created_at <= timestamp {
                identity.insert(revision.field, revision.value);
            }
        }
        Ok(identity)
    }

    /// First and current value of one field.
    ///
    /// # Contract
    /// - `NoHistory` when the field has fewer than two revisions.
    pub fn diff(&self, field: FieldName) -> RepoResult<(String, String)> {
        let history = self.repo.history(field)?;
        match (history.first(), history.last()) {
            (Some(first), Some(last)) if history.len() >= 2 => {
                Ok((first.value.clone(), last.value.clone()))
            }
            _ => Err(RepoError::NoHistory(field)),
        }
    }

    /// (first, current) for every field with at least two revisions.
    pub fn diff_all(&self) -> RepoResult<BTreeMap<FieldName, (String, String)>> {
        let mut diffs = BTreeMap::new();
        for field in ALL_FIELDS {
            match self.diff(field) {
                Ok(pair) => {
                    diffs.insert(field, pair);
                }
                Err(RepoError::NoHistory(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(diffs)
    }

    /// Chronological evolution, across all fields or scoped to one.
    pub fn timeline(&self, field: Option<FieldName>) -> RepoResult<Vec<FieldRevision>> {
        match field {
            Some(field) => self.repo.history(field),
            None => self.repo.all(),
        }
    }
}
