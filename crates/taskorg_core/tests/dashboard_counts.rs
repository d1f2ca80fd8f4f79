use chrono::{TimeZone, Utc};
use taskorg_core::db::open_db_in_memory;
use taskorg_core::{dashboard, Category, EntitySchema, FormData, Priority, SqliteStore, Task};

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn epoch_ms(year: i32, month: u32, day: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .unwrap()
        .timestamp_millis()
}

#[test]
fn empty_store_reports_all_zero() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

    let counts = dashboard::counts_at(&store, now).unwrap();
    assert_eq!(counts.categories.total, 0);
    assert_eq!(counts.priorities.total, 0);
    assert_eq!(counts.tasks.total, 0);
    assert_eq!(counts.subtasks.total, 0);
    assert_eq!(counts.notes.total, 0);
    assert_eq!(counts.tasks.created_this_year, 0);
}

#[test]
fn year_count_only_includes_rows_created_in_the_anchor_year() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let category_id = store
        .create::<Category>(&Category::validate(&form(&[("name", "Work")])).unwrap())
        .unwrap();
    let priority_id = store
        .create::<Priority>(&Priority::validate(&form(&[("name", "High")])).unwrap())
        .unwrap();

    let task_form = |title: &str| {
        form(&[
            ("title", title),
            ("description", "Seeded"),
            ("deadline", "2025-06-01 09:00"),
            ("status", "Pending"),
            ("category", &category_id.to_string()),
            ("priority", &priority_id.to_string()),
        ])
    };
    let last_year = store
        .create::<Task>(&Task::validate(&task_form("From last year")).unwrap())
        .unwrap();
    let this_year = store
        .create::<Task>(&Task::validate(&task_form("From this year")).unwrap())
        .unwrap();
    let next_year = store
        .create::<Task>(&Task::validate(&task_form("From next year")).unwrap())
        .unwrap();

    // Pin creation moments so the window cut is deterministic.
    for (id, stamp) in [
        (last_year, epoch_ms(2023, 11, 5)),
        (this_year, epoch_ms(2024, 3, 1)),
        (next_year, epoch_ms(2025, 1, 1)),
    ] {
        conn.execute(
            "UPDATE tasks SET created_at = ? WHERE id = ?;",
            [stamp, id],
        )
        .unwrap();
    }

    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let counts = dashboard::counts_at(&store, now).unwrap();
    assert_eq!(counts.tasks.total, 3);
    assert_eq!(counts.tasks.created_this_year, 1);
}

#[test]
fn year_boundaries_are_inclusive_start_exclusive_end() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let first = store
        .create::<Category>(&Category::validate(&form(&[("name", "First instant")])).unwrap())
        .unwrap();
    let last = store
        .create::<Category>(&Category::validate(&form(&[("name", "Next instant")])).unwrap())
        .unwrap();

    let jan_first_2024 = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap()
        .timestamp_millis();
    let jan_first_2025 = Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .unwrap()
        .timestamp_millis();
    conn.execute(
        "UPDATE categories SET created_at = ? WHERE id = ?;",
        [jan_first_2024, first],
    )
    .unwrap();
    conn.execute(
        "UPDATE categories SET created_at = ? WHERE id = ?;",
        [jan_first_2025, last],
    )
    .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let counts = dashboard::counts_at(&store, now).unwrap();
    assert_eq!(counts.categories.total, 2);
    assert_eq!(counts.categories.created_this_year, 1);
}

#[test]
fn counts_anchored_at_now_see_freshly_created_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    store
        .create::<Category>(&Category::validate(&form(&[("name", "Work")])).unwrap())
        .unwrap();

    let counts = dashboard::counts(&store).unwrap();
    assert_eq!(counts.categories.total, 1);
    assert_eq!(counts.categories.created_this_year, 1);
}
