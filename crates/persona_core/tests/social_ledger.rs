use persona_core::db::open_db_in_memory;
use persona_core::{
    BondType, RepoError, SocialRepository, SocialService, SqliteSocialRepository,
};
use std::collections::BTreeMap;

const PEER: &str = "abc1234567890def";

fn snapshot(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn duplicate_bonds_are_preserved() {
    let conn = open_db_in_memory().unwrap();
    let service = SocialService::new(SqliteSocialRepository::new(&conn));

    service.add_bond(PEER, "kindred", Some("note")).unwrap();
    service.add_bond(PEER, "kindred", Some("note")).unwrap();

    let bonds = service.list_bonds().unwrap();
    assert_eq!(bonds.len(), 2);
    assert!(bonds.iter().all(|bond| bond.bond_type == BondType::Kindred));
}

#[test]
fn unknown_bond_type_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let service = SocialService::new(SqliteSocialRepository::new(&conn));

    let err = service.add_bond(PEER, "frenemy", None).unwrap_err();
    assert!(matches!(err, RepoError::UnknownBondType(value) if value == "frenemy"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM bonds;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn invalid_peer_hash_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = SocialService::new(SqliteSocialRepository::new(&conn));

    let err = service.add_bond("NOT-HEX", "ally", None).unwrap_err();
    assert!(matches!(err, RepoError::InvalidPeerHash(_)));

    let err = service.record_letter("short", "hi").unwrap_err();
    assert!(matches!(err, RepoError::InvalidPeerHash(_)));
}

#[test]
fn bonds_list_is_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO bonds (peer_hash, bond_type, note, created_at) VALUES
            ('abc1234567890def', 'ally', NULL, 1000),
            ('abc1234567890def', 'mentor', NULL, 2000);",
    )
    .unwrap();

    let bonds = SqliteSocialRepository::new(&conn).list_bonds().unwrap();
    assert_eq!(bonds[0].bond_type, BondType::Mentor);
    assert_eq!(bonds[1].bond_type, BondType::Ally);
}

#[test]
fn repeat_encounters_accumulate_instead_of_overwriting() {
    let conn = open_db_in_memory().unwrap();
    let service = SocialService::new(SqliteSocialRepository::new(&conn));

    service
        .record_encounter(PEER, "Vesper", &snapshot(&[("name", "Vesper")]))
        .unwrap();
    service
        .record_encounter(PEER, "Vesper", &snapshot(&[("name", "Vesper"), ("voice", "quiet")]))
        .unwrap();

    let encounters = service.list_encounters().unwrap();
    assert_eq!(encounters.len(), 2);
    // Most recent first; the newer snapshot has the extra field.
    assert_eq!(encounters[0].snapshot_fields.len(), 2);
    assert_eq!(encounters[1].snapshot_fields.len(), 1);
}

#[test]
fn find_encounter_prefers_exact_hash_then_prefix_then_name() {
    let conn = open_db_in_memory().unwrap();
    let service = SocialService::new(SqliteSocialRepository::new(&conn));

    service
        .record_encounter("abc1234567890def", "Vesper", &snapshot(&[]))
        .unwrap();
    service
        .record_encounter("def4567890abc123", "Sable", &snapshot(&[]))
        .unwrap();

    let exact = service.find_encounter("abc1234567890def").unwrap().unwrap();
    assert_eq!(exact.peer_name, "Vesper");

    let by_prefix = service.find_encounter("def45678").unwrap().unwrap();
    assert_eq!(by_prefix.peer_name, "Sable");

    let by_name = service.find_encounter("Sable").unwrap().unwrap();
    assert_eq!(by_name.peer_hash, "def4567890abc123");

    assert!(service.find_encounter("nobody").unwrap().is_none());
}

#[test]
fn letters_persist_locally_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO letters (target_hash, message, created_at) VALUES
            ('abc1234567890def', 'first letter', 1000),
            ('abc1234567890def', 'second letter', 2000);",
    )
    .unwrap();

    let service = SocialService::new(SqliteSocialRepository::new(&conn));
    service.record_letter(PEER, "third letter").unwrap();

    let letters = service.list_letters().unwrap();
    assert_eq!(letters.len(), 3);
    assert_eq!(letters[0].message, "third letter");
    assert_eq!(letters[2].message, "first letter");
}
