//! Social ledger: contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append-only persistence of encounters, bonds, and outgoing letters.
//! - Local-first peer resolution over the encounter cache.
//!
//! # Invariants
//! - A repeat observation of the same peer is a new encounter record; the
//!   ledger never overwrites how a peer looked at an earlier lookup.
//! - Duplicate bonds (same peer, type, note) are permitted and preserved.
//! - Letters are persisted before and independent of any delivery attempt.

use crate::model::social::{
    Bond, BondId, BondType, Encounter, EncounterId, Letter, LetterId,
};
use crate::repo::{RepoError, RepoResult};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const BOND_SELECT_SQL: &str = "SELECT id, peer_hash, bond_type, note, created_at FROM bonds";
const ENCOUNTER_SELECT_SQL: &str =
    "SELECT id, peer_hash, peer_name, snapshot_json, fetched_at FROM encounters";
const LETTER_SELECT_SQL: &str = "SELECT id, target_hash, message, created_at FROM letters";

/// Repository interface for the social ledger.
pub trait SocialRepository {
    /// Records one observation of a peer's card. Always a new record.
    fn record_encounter(
        &self,
        peer_hash: &str,
        peer_name: &str,
        fields: &BTreeMap<String, String>,
    ) -> RepoResult<EncounterId>;
    /// Records one bond. Duplicates are allowed.
    fn add_bond(&self, peer_hash: &str, bond_type: BondType, note: Option<&str>)
        -> RepoResult<BondId>;
    /// Lists bonds most-recent-first.
    fn list_bonds(&self) -> RepoResult<Vec<Bond>>;
    /// Lists encounters most-recent-first.
    fn list_encounters(&self) -> RepoResult<Vec<Encounter>>;
    /// Resolves a peer from the local cache: exact hash, then hash prefix,
    /// then exact name. Most recent observation wins within each tier.
    fn find_encounter(&self, query: &str) -> RepoResult<Option<Encounter>>;
    /// Persists one outgoing letter.
    fn record_letter(&self, target_hash: &str, message: &str) -> RepoResult<LetterId>;
    /// Lists outgoing letters most-recent-first.
    fn list_letters(&self) -> RepoResult<Vec<Letter>>;
}

/// SQLite-backed social ledger.
pub struct SqliteSocialRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSocialRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SocialRepository for SqliteSocialRepository<'_> {
    fn record_encounter(
        &self,
        peer_hash: &str,
        peer_name: &str,
        fields: &BTreeMap<String, String>,
    ) -> RepoResult<EncounterId> {
        let snapshot_json = serde_json::to_string(fields).map_err(|err| {
            RepoError::InvalidData(format!("unserializable encounter snapshot: {err}"))
        })?;

        self.conn.execute(
            "INSERT INTO encounters (peer_hash, peer_name, snapshot_json, fetched_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                peer_hash,
                peer_name,
                snapshot_json,
                Utc::now().timestamp_millis()
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn add_bond(
        &self,
        peer_hash: &str,
        bond_type: BondType,
        note: Option<&str>,
    ) -> RepoResult<BondId> {
        self.conn.execute(
            "INSERT INTO bonds (peer_hash, bond_type, note, created_at)
             SELECT ?1, ?2, ?3, MAX(?4, COALESCE((SELECT MAX(created_at) FROM bonds), 0));",
            params![
                peer_hash,
                bond_type.as_str(),
                note,
                Utc::now().timestamp_millis()
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_bonds(&self) -> RepoResult<Vec<Bond>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOND_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;

        let mut rows = stmt.query([])?;
        let mut bonds = Vec::new();
        while let Some(row) = rows.next()? {
            bonds.push(parse_bond_row(row)?);
        }

        Ok(bonds)
    }

    fn list_encounters(&self) -> RepoResult<Vec<Encounter>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENCOUNTER_SELECT_SQL} ORDER BY fetched_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut encounters = Vec::new();
        while let Some(row) = rows.next()? {
            encounters.push(parse_encounter_row(row)?);
        }

        Ok(encounters)
    }

    fn find_encounter(&self, query: &str) -> RepoResult<Option<Encounter>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENCOUNTER_SELECT_SQL}
             WHERE peer_hash = ?1
             ORDER BY fetched_at DESC, id DESC
             LIMIT 1;"
        ))?;
        if let Some(encounter) = query_one_encounter(&mut stmt, [query])? {
            return Ok(Some(encounter));
        }

        // LIKE prefix match; escape wildcard characters in the query first.
        let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let mut stmt = self.conn.prepare(&format!(
            "{ENCOUNTER_SELECT_SQL}
             WHERE peer_hash LIKE ?1 ESCAPE '\\'
             ORDER BY fetched_at DESC, id DESC
             LIMIT 1;"
        ))?;
        if let Some(encounter) = query_one_encounter(&mut stmt, [format!("{escaped}%")])? {
            return Ok(Some(encounter));
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ENCOUNTER_SELECT_SQL}
             WHERE peer_name = ?1
             ORDER BY fetched_at DESC, id DESC
             LIMIT 1;"
        ))?;
        query_one_encounter(&mut stmt, [query])
    }

    fn record_letter(&self, target_hash: &str, message: &str) -> RepoResult<LetterId> {
        self.conn.execute(
            "INSERT INTO letters (target_hash, message, created_at)
             VALUES (?1, ?2, ?3);",
            params![target_hash, message, Utc::now().timestamp_millis()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_letters(&self) -> RepoResult<Vec<Letter>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LETTER_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;

        let mut rows = stmt.query([])?;
        let mut letters = Vec::new();
        while let Some(row) = rows.next()? {
            letters.push(parse_letter_row(row)?);
        }

        Ok(letters)
    }
}

fn query_one_encounter<P: rusqlite::Params>(
    stmt: &mut rusqlite::Statement<'_>,
    params: P,
) -> RepoResult<Option<Encounter>> {
    let mut rows = stmt.query(params)?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_encounter_row(row)?));
    }
    Ok(None)
}

pub(crate) fn parse_bond_row(row: &Row<'_>) -> RepoResult<Bond> {
    let bond_type_text: String = row.get("bond_type")?;
    let bond_type = BondType::parse(&bond_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid bond type `{bond_type_text}` in bonds.bond_type"
        ))
    })?;

    Ok(Bond {
        id: row.get("id")?,
        peer_hash: row.get("peer_hash")?,
        bond_type,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_encounter_row(row: &Row<'_>) -> RepoResult<Encounter> {
    let snapshot_json: String = row.get("snapshot_json")?;
    let snapshot_fields: BTreeMap<String, String> = serde_json::from_str(&snapshot_json)
        .map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid snapshot json in encounters.snapshot_json: {err}"
            ))
        })?;

    Ok(Encounter {
        id: row.get("id")?,
        peer_hash: row.get("peer_hash")?,
        peer_name: row.get("peer_name")?,
        snapshot_fields,
        fetched_at: row.get("fetched_at")?,
    })
}

fn parse_letter_row(row: &Row<'_>) -> RepoResult<Letter> {
    Ok(Letter {
        id: row.get("id")?,
        target_hash: row.get("target_hash")?,
        message: row.get("message")?,
        created_at: row.get("created_at")?,
    })
}
