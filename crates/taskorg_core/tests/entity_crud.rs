use rusqlite::Connection;
use taskorg_core::db::open_db_in_memory;
use taskorg_core::{
    Category, EntitySchema, FormData, Priority, RepoError, SqliteStore, Status, Task,
};

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn create_category(store: &SqliteStore<'_>, name: &str) -> i64 {
    let values = Category::validate(&form(&[("name", name)])).unwrap();
    store.create::<Category>(&values).unwrap()
}

fn create_priority(store: &SqliteStore<'_>, name: &str) -> i64 {
    let values = Priority::validate(&form(&[("name", name)])).unwrap();
    store.create::<Priority>(&values).unwrap()
}

fn task_form(title: &str, category_id: i64, priority_id: i64) -> FormData {
    form(&[
        ("title", title),
        ("description", "Test desc"),
        ("deadline", "2025-06-01 09:00:00"),
        ("status", "Pending"),
        ("category", &category_id.to_string()),
        ("priority", &priority_id.to_string()),
    ])
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let id = create_category(&store, "Work");
    let loaded = store.get::<Category>(id).unwrap().unwrap();

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.name, "Work");
    assert!(loaded.created_at > 0);
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn create_task_resolves_joined_display_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let category_id = create_category(&store, "Work");
    let priority_id = create_priority(&store, "High");
    let values = Task::validate(&task_form("Initial Task", category_id, priority_id)).unwrap();
    let id = store.create::<Task>(&values).unwrap();

    let task = store.get::<Task>(id).unwrap().unwrap();
    assert_eq!(task.title, "Initial Task");
    assert_eq!(task.status, Status::Pending);
    assert_eq!(task.category_name, "Work");
    assert_eq!(task.priority_name, "High");
}

#[test]
fn update_refreshes_updated_at_and_preserves_created_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let id = create_category(&store, "Work");
    // Push the stored timestamps into the past so the refresh is observable.
    conn.execute(
        "UPDATE categories SET created_at = 1000, updated_at = 1000 WHERE id = ?;",
        [id],
    )
    .unwrap();

    let values = Category::validate(&form(&[("name", "Personal")])).unwrap();
    store.update::<Category>(id, &values).unwrap();

    let loaded = store.get::<Category>(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Personal");
    assert_eq!(loaded.created_at, 1000);
    assert!(loaded.updated_at > 1000);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let values = Category::validate(&form(&[("name", "Ghost")])).unwrap();
    let err = store.update::<Category>(999, &values).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 999, .. }));
}

#[test]
fn delete_not_found_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    create_category(&store, "Work");
    let err = store.delete::<Category>(999).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id: 999, .. }));
    assert_eq!(store.count::<Category>().unwrap(), 1);
}

#[test]
fn dangling_foreign_key_is_a_field_level_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let priority_id = create_priority(&store, "High");
    let values = Task::validate(&task_form("Orphan", 42, priority_id)).unwrap();
    let err = store.create::<Task>(&values).unwrap_err();

    match err {
        RepoError::Validation(validation) => {
            assert_eq!(validation.errors.len(), 1);
            assert_eq!(validation.errors[0].field, "category");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.count::<Task>().unwrap(), 0);
}

#[test]
fn invalid_status_is_rejected_at_validation() {
    let mut bad = task_form("Bad status", 1, 1);
    bad.insert("status".to_string(), "Paused".to_string());

    let validation = Task::validate(&bad).unwrap_err();
    assert!(validation
        .errors
        .iter()
        .any(|err| err.field == "status" && err.message.contains("Paused")));
}

#[test]
fn length_caps_collect_per_field_detail() {
    let long = "x".repeat(51);
    let mut bad = task_form(&long, 1, 1);
    bad.insert("description".to_string(), long.clone());

    let validation = Task::validate(&bad).unwrap_err();
    let fields: Vec<&str> = validation
        .errors
        .iter()
        .map(|err| err.field.as_str())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"description"));
}

#[test]
fn store_rejects_invalid_persisted_status() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let category_id = create_category(&store, "Work");
    let priority_id = create_priority(&store, "High");
    let values = Task::validate(&task_form("Initial Task", category_id, priority_id)).unwrap();
    let id = store.create::<Task>(&values).unwrap();

    // Bypass validation to corrupt the row the way a foreign writer could.
    conn.execute("UPDATE tasks SET status = 'Paused' WHERE id = ?;", [id])
        .unwrap();

    let err = store.get::<Task>(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn writes_require_a_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let values = Category::validate(&form(&[("name", "Work")])).unwrap();
    assert!(store.create::<Category>(&values).is_err());
}
