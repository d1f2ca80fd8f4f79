use taskorg_core::db::open_db_in_memory;
use taskorg_core::{
    Category, College, EntitySchema, FormData, Note, Priority, Program, SqliteStore, SubTask, Task,
};

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

struct Seed {
    category_id: i64,
    priority_id: i64,
    task_id: i64,
    subtask_id: i64,
    note_id: i64,
}

fn seed_task_tree(store: &SqliteStore<'_>) -> Seed {
    let category_id = store
        .create::<Category>(&Category::validate(&form(&[("name", "Work")])).unwrap())
        .unwrap();
    let priority_id = store
        .create::<Priority>(&Priority::validate(&form(&[("name", "High")])).unwrap())
        .unwrap();
    let task_id = store
        .create::<Task>(
            &Task::validate(&form(&[
                ("title", "Quarterly report"),
                ("description", "Finish the draft"),
                ("deadline", "2025-06-01 09:00"),
                ("status", "In progress"),
                ("category", &category_id.to_string()),
                ("priority", &priority_id.to_string()),
            ]))
            .unwrap(),
        )
        .unwrap();
    let subtask_id = store
        .create::<SubTask>(
            &SubTask::validate(&form(&[
                ("task", &task_id.to_string()),
                ("title", "Collect figures"),
                ("status", "Pending"),
            ]))
            .unwrap(),
        )
        .unwrap();
    let note_id = store
        .create::<Note>(
            &Note::validate(&form(&[
                ("task", &task_id.to_string()),
                ("content", "Draft sent for review"),
            ]))
            .unwrap(),
        )
        .unwrap();
    Seed {
        category_id,
        priority_id,
        task_id,
        subtask_id,
        note_id,
    }
}

#[test]
fn deleting_a_task_removes_its_subtasks_and_notes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let seed = seed_task_tree(&store);

    store.delete::<Task>(seed.task_id).unwrap();

    assert!(store.get::<SubTask>(seed.subtask_id).unwrap().is_none());
    assert!(store.get::<Note>(seed.note_id).unwrap().is_none());
    // Parents of the task are untouched.
    assert!(store.get::<Category>(seed.category_id).unwrap().is_some());
    assert!(store.get::<Priority>(seed.priority_id).unwrap().is_some());
}

#[test]
fn deleting_a_category_cascades_through_tasks_to_their_children() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let seed = seed_task_tree(&store);

    store.delete::<Category>(seed.category_id).unwrap();

    assert!(store.get::<Task>(seed.task_id).unwrap().is_none());
    assert!(store.get::<SubTask>(seed.subtask_id).unwrap().is_none());
    assert!(store.get::<Note>(seed.note_id).unwrap().is_none());
    assert_eq!(store.count::<Priority>().unwrap(), 1);
}

#[test]
fn deleting_a_priority_cascades_to_its_tasks() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let seed = seed_task_tree(&store);

    store.delete::<Priority>(seed.priority_id).unwrap();

    assert!(store.get::<Task>(seed.task_id).unwrap().is_none());
    assert!(store.get::<SubTask>(seed.subtask_id).unwrap().is_none());
    assert_eq!(store.count::<Category>().unwrap(), 1);
}

#[test]
fn deleting_a_college_detaches_its_programs_instead_of_removing_them() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);

    let college_id = store
        .create::<College>(
            &College::validate(&form(&[("college_name", "Engineering")])).unwrap(),
        )
        .unwrap();
    let program_id = store
        .create::<Program>(
            &Program::validate(&form(&[
                ("name", "Robotics Club"),
                ("prog_name", "ROBO"),
                ("description", "Weekly build sessions"),
                ("college", &college_id.to_string()),
            ]))
            .unwrap(),
        )
        .unwrap();

    let before = store.get::<Program>(program_id).unwrap().unwrap();
    assert_eq!(before.college_id, Some(college_id));
    assert_eq!(before.college_name.as_deref(), Some("Engineering"));

    store.delete::<College>(college_id).unwrap();

    let after = store.get::<Program>(program_id).unwrap().unwrap();
    assert_eq!(after.college_id, None);
    assert_eq!(after.college_name, None);
    assert_eq!(after.name, "Robotics Club");
}
