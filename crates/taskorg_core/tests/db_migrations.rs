use taskorg_core::db::migrations::{apply_migrations, latest_version};
use taskorg_core::db::{open_db, open_db_in_memory, DbError};
use taskorg_core::{Category, EntitySchema, FormData, SqliteStore};

fn user_version(conn: &rusqlite::Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_database_lands_on_the_latest_version() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(user_version(&conn), latest_version());
    assert!(latest_version() >= 1);
}

#[test]
fn migrations_create_every_entity_table() {
    let conn = open_db_in_memory().unwrap();
    for table in [
        "categories",
        "priorities",
        "tasks",
        "subtasks",
        "notes",
        "colleges",
        "programs",
    ] {
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?;",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1, "missing table {table}");
    }
}

#[test]
fn reapplying_on_a_current_database_is_a_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(user_version(&conn), latest_version());
}

#[test]
fn newer_schema_versions_are_rejected() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedSchemaVersion { .. }));
}

#[test]
fn foreign_keys_are_enforced_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    // With enforcement on, a raw orphan insert must fail at the engine level.
    let result = conn.execute(
        "INSERT INTO subtasks (task_id, title, status, created_at, updated_at) \
         VALUES (999, 'Orphan', 'Pending', 0, 0);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn file_backed_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskorg.sqlite3");

    let name_form: FormData = [("name".to_string(), "Work".to_string())].into();
    let id = {
        let conn = open_db(&path).unwrap();
        let store = SqliteStore::new(&conn);
        store
            .create::<Category>(&Category::validate(&name_form).unwrap())
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let store = SqliteStore::new(&conn);
    let loaded = store.get::<Category>(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Work");
}
