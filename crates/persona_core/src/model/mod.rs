//! Domain model for the identity ledger.
//!
//! # Responsibility
//! - Define canonical record types shared by repositories and services.
//! - Keep closed vocabularies (field names, note kinds, bond types) in one
//!   place so validation happens at the string boundary, not in SQL.
//!
//! # Invariants
//! - Every persisted record is immutable once written; there is no
//!   update-in-place anywhere in the model.
//! - Timestamps are epoch milliseconds and ordering is `(created_at, id)`.

pub mod identity;
pub mod note;
pub mod social;
