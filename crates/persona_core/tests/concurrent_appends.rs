use persona_core::db::open_db;
use persona_core::{FieldName, RevisionRepository, SqliteRevisionRepository};
use std::thread;

#[test]
fn concurrent_appends_from_two_connections_both_land() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persona.db");

    // Migrate once before the writers race.
    drop(open_db(&path).unwrap());

    let path_a = path.clone();
    let path_b = path.clone();

    let writer_a = thread::spawn(move || {
        let conn = open_db(&path_a).unwrap();
        let repo = SqliteRevisionRepository::new(&conn);
        for i in 0..20 {
            repo.append(FieldName::Name, &format!("a{i}")).unwrap();
        }
    });
    let writer_b = thread::spawn(move || {
        let conn = open_db(&path_b).unwrap();
        let repo = SqliteRevisionRepository::new(&conn);
        for i in 0..20 {
            repo.append(FieldName::Name, &format!("b{i}")).unwrap();
        }
    });

    writer_a.join().unwrap();
    writer_b.join().unwrap();

    let conn = open_db(&path).unwrap();
    let history = SqliteRevisionRepository::new(&conn)
        .history(FieldName::Name)
        .unwrap();

    // Every append from both writers is visible, none corrupted.
    assert_eq!(history.len(), 40);
    assert!(history.iter().all(|revision| {
        let value = revision.value.as_str();
        (value.starts_with('a') || value.starts_with('b')) && !revision.value.is_empty()
    }));

    // Per-writer order is preserved by (created_at, id).
    let a_values: Vec<&str> = history
        .iter()
        .filter(|revision| revision.value.starts_with('a'))
        .map(|revision| revision.value.as_str())
        .collect();
    let expected: Vec<String> = (0..20).map(|i| format!("a{i}")).collect();
    assert_eq!(a_values, expected.iter().map(String::as_str).collect::<Vec<_>>());
}
