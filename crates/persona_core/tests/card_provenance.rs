use persona_core::db::open_db_in_memory;
use persona_core::{
    generate_card, FieldName, IdentityService, RevisionRepository, SqliteRevisionRepository,
};

#[test]
fn evolve_then_diff_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn);

    repo.append(FieldName::Name, "Vermillion").unwrap();
    repo.append(FieldName::Name, "Vesper").unwrap();

    let service = IdentityService::new(SqliteRevisionRepository::new(&conn));
    let identity = service.current().unwrap();
    assert_eq!(identity.get(&FieldName::Name).map(String::as_str), Some("Vesper"));

    let (first, current) = service.diff(FieldName::Name).unwrap();
    assert_eq!((first.as_str(), current.as_str()), ("Vermillion", "Vesper"));
}

#[test]
fn card_hash_is_stable_across_separately_derived_views() {
    let conn_a = open_db_in_memory().unwrap();
    let conn_b = open_db_in_memory().unwrap();

    // Same field content, different insertion order and history depth.
    let repo_a = SqliteRevisionRepository::new(&conn_a);
    repo_a.append(FieldName::Name, "Vermillion").unwrap();
    repo_a.append(FieldName::Voice, "quiet").unwrap();

    let repo_b = SqliteRevisionRepository::new(&conn_b);
    repo_b.append(FieldName::Voice, "loud").unwrap();
    repo_b.append(FieldName::Voice, "quiet").unwrap();
    repo_b.append(FieldName::Name, "Vermillion").unwrap();

    let identity_a = IdentityService::new(SqliteRevisionRepository::new(&conn_a))
        .current()
        .unwrap();
    let identity_b = IdentityService::new(SqliteRevisionRepository::new(&conn_b))
        .current()
        .unwrap();

    assert_eq!(
        generate_card(&identity_a).unwrap().hash,
        generate_card(&identity_b).unwrap().hash
    );
}

#[test]
fn hash_changes_when_any_field_value_changes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn);
    let service = IdentityService::new(SqliteRevisionRepository::new(&conn));

    repo.append(FieldName::Name, "Vermillion").unwrap();
    let before = generate_card(&service.current().unwrap()).unwrap();

    repo.append(FieldName::Name, "Vermillior").unwrap();
    let after = generate_card(&service.current().unwrap()).unwrap();

    assert_ne!(before.hash, after.hash);
}

#[test]
fn hash_ignores_generation_metadata() {
    let conn = open_db_in_memory().unwrap();
    SqliteRevisionRepository::new(&conn)
        .append(FieldName::Name, "Vesper")
        .unwrap();

    let identity = IdentityService::new(SqliteRevisionRepository::new(&conn))
        .current()
        .unwrap();
    let first = generate_card(&identity).unwrap();
    let second = generate_card(&identity).unwrap();

    // generated_at may differ between the two calls; the hash must not.
    assert_eq!(first.hash, second.hash);
    assert_eq!(first.fields, second.fields);
}
