//! Core domain logic for the persona identity ledger.
//! This crate is the single source of truth for business invariants.

pub mod card;
pub mod db;
pub mod dream;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use card::{generate as generate_card, Card, CardError, CardResult};
pub use dream::{aggregate, DreamEntry};
pub use export::{export_snapshot, stats, ExportError, ExportResult, LedgerStats, Snapshot};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::{FieldName, FieldRevision, Identity, RevisionId, ALL_FIELDS};
pub use model::note::{NoteEntry, NoteId, NoteKind};
pub use model::social::{
    Bond, BondId, BondType, Encounter, EncounterId, Letter, LetterId, ALL_BOND_TYPES,
};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::revision_repo::{RevisionRepository, SqliteRevisionRepository};
pub use repo::social_repo::{SocialRepository, SqliteSocialRepository};
pub use repo::{RepoError, RepoResult};
pub use service::identity_service::IdentityService;
pub use service::social_service::SocialService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
