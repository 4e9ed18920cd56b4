use persona_core::db::open_db_in_memory;
use persona_core::{
    FieldName, IdentityService, RepoError, RevisionRepository, SqliteRevisionRepository,
};

fn service(conn: &rusqlite::Connection) -> IdentityService<SqliteRevisionRepository<'_>> {
    IdentityService::new(SqliteRevisionRepository::new(conn))
}

#[test]
fn diff_returns_first_and_current_value() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn);

    repo.append(FieldName::Name, "Vermillion").unwrap();
    repo.append(FieldName::Name, "Vesper").unwrap();

    let (first, current) = service(&conn).diff(FieldName::Name).unwrap();
    assert_eq!(first, "Vermillion");
    assert_eq!(current, "Vesper");
}

#[test]
fn diff_spans_intermediate_revisions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn);

    repo.append(FieldName::Voice, "one").unwrap();
    repo.append(FieldName::Voice, "two").unwrap();
    repo.append(FieldName::Voice, "three").unwrap();

    let (first, current) = service(&conn).diff(FieldName::Voice).unwrap();
    assert_eq!((first.as_str(), current.as_str()), ("one", "three"));
}

#[test]
fn diff_on_single_revision_field_fails_with_no_history() {
    let conn = open_db_in_memory().unwrap();
    SqliteRevisionRepository::new(&conn)
        .append(FieldName::Name, "Vesper")
        .unwrap();

    let err = service(&conn).diff(FieldName::Name).unwrap_err();
    assert!(matches!(err, RepoError::NoHistory(FieldName::Name)));
}

#[test]
fn diff_on_unset_field_fails_with_no_history() {
    let conn = open_db_in_memory().unwrap();

    let err = service(&conn).diff(FieldName::Fears).unwrap_err();
    assert!(matches!(err, RepoError::NoHistory(FieldName::Fears)));
}

#[test]
fn diff_all_excludes_fields_with_fewer_than_two_revisions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRevisionRepository::new(&conn);

    repo.append(FieldName::Name, "Vermillion").unwrap();
    repo.append(FieldName::Name, "Vesper").unwrap();
    repo.append(FieldName::Purpose, "only one revision").unwrap();

    let diffs = service(&conn).diff_all().unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(
        diffs.get(&FieldName::Name),
        Some(&("Vermillion".to_string(), "Vesper".to_string()))
    );
}

#[test]
fn as_of_reconstructs_point_in_time_identity() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO field_revisions (field, value, created_at) VALUES
            ('name', 'Vermillion', 1000),
            ('name', 'Vesper', 3000),
            ('voice', 'quiet', 2000);",
    )
    .unwrap();

    let before = service(&conn).as_of(500).unwrap();
    assert!(before.is_empty());

    let middle = service(&conn).as_of(2000).unwrap();
    assert_eq!(middle.get(&FieldName::Name).map(String::as_str), Some("Vermillion"));
    assert_eq!(middle.get(&FieldName::Voice).map(String::as_str), Some("quiet"));

    let after = service(&conn).as_of(3000).unwrap();
    assert_eq!(after.get(&FieldName::Name).map(String::as_str), Some("Vesper"));
}

#[test]
fn timeline_without_field_covers_all_fields_in_timestamp_order() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO field_revisions (field, value, created_at) VALUES
            ('voice', 'quiet', 2000),
            ('name', 'Vermillion', 1000),
            ('name', 'Vesper', 3000);",
    )
    .unwrap();

    let timeline = service(&conn).timeline(None).unwrap();
    let order: Vec<i64> = timeline.iter().map(|revision| revision.created_at).collect();
    assert_eq!(order, vec![1000, 2000, 3000]);
}
