//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Hold the string-boundary validation (field names, bond types, peer
//!   hashes) so repositories only see typed, validated input.
//!
//! # Invariants
//! - Validation errors are detected before any write reaches storage.

pub mod identity_service;
pub mod social_service;
