//! Schema descriptors for tasks and their child entities.
//!
//! # Invariants
//! - Task category/priority references are mandatory; subtask/note parent
//!   references are mandatory. All three cascade on parent delete.
//! - Searching a child entity also matches the parent task title.

use crate::model::entities::{Note, Status, SubTask, Task};
use crate::model::form::{
    datetime_field, id_field, required_text, status_field, FormData, ValidationError,
};
use crate::repo::{RepoError, RepoResult};
use crate::schema::{EntityKind, EntitySchema, Relation, RowValues, SortKey, TableSpec};
use rusqlite::types::Value;
use rusqlite::Row;

const TEXT_MAX_LEN: usize = 50;

fn status_from_row(row: &Row<'_>, table: &str) -> RepoResult<Status> {
    let raw: String = row.get("status")?;
    Status::parse(&raw)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{raw}` in {table}.status")))
}

static TASK_TABLE: TableSpec = TableSpec {
    table: "tasks",
    select_sql: "SELECT tasks.id, tasks.title, tasks.description, tasks.deadline, \
                 tasks.status, tasks.category_id, categories.name AS category_name, \
                 tasks.priority_id, priorities.name AS priority_name, \
                 tasks.created_at, tasks.updated_at \
                 FROM tasks \
                 INNER JOIN categories ON categories.id = tasks.category_id \
                 INNER JOIN priorities ON priorities.id = tasks.priority_id",
    count_sql: "SELECT COUNT(*) FROM tasks \
                INNER JOIN categories ON categories.id = tasks.category_id \
                INNER JOIN priorities ON priorities.id = tasks.priority_id",
    searchable: &[
        "tasks.title",
        "tasks.description",
        "tasks.status",
        "priorities.name",
        "categories.name",
    ],
    sortable: &[
        SortKey {
            key: "title",
            expr: "tasks.title",
            descending: false,
        },
        SortKey {
            key: "status",
            expr: "tasks.status",
            descending: false,
        },
        SortKey {
            key: "deadline",
            expr: "tasks.deadline",
            descending: false,
        },
        SortKey {
            key: "priority__name",
            expr: "priorities.name",
            descending: false,
        },
        SortKey {
            key: "category__name",
            expr: "categories.name",
            descending: false,
        },
        SortKey {
            key: "created_at",
            expr: "tasks.created_at",
            descending: false,
        },
        SortKey {
            key: "-created_at",
            expr: "tasks.created_at",
            descending: true,
        },
    ],
    default_order: &[
        "categories.name ASC",
        "priorities.name ASC",
        "tasks.title ASC",
    ],
    default_sort_key: "category__name",
    id_expr: "tasks.id",
};

static TASK_RELATIONS: [Relation; 2] = [
    Relation {
        field: "category",
        column: "category_id",
        parent_table: "categories",
    },
    Relation {
        field: "priority",
        column: "priority_id",
        parent_table: "priorities",
    },
];

impl EntitySchema for Task {
    type Record = Task;

    const KIND: EntityKind = EntityKind::Task;

    fn table() -> &'static TableSpec {
        &TASK_TABLE
    }

    fn relations() -> &'static [Relation] {
        &TASK_RELATIONS
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let title = required_text(form, "title", TEXT_MAX_LEN, &mut errors);
        let description = required_text(form, "description", TEXT_MAX_LEN, &mut errors);
        let deadline = datetime_field(form, "deadline", &mut errors);
        let status = status_field(form, "status", &mut errors);
        let category_id = id_field(form, "category", &mut errors);
        let priority_id = id_field(form, "priority", &mut errors);

        let mut values = RowValues::new();
        if let Some(title) = title {
            values.push("title", Value::Text(title));
        }
        if let Some(description) = description {
            values.push("description", Value::Text(description));
        }
        if let Some(deadline) = deadline {
            values.push("deadline", Value::Integer(deadline));
        }
        values.push("status", Value::Text(status.as_db().to_string()));
        if let Some(category_id) = category_id {
            values.push("category_id", Value::Integer(category_id));
        }
        if let Some(priority_id) = priority_id {
            values.push("priority_id", Value::Integer(priority_id));
        }
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Task> {
        Ok(Task {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            deadline: row.get("deadline")?,
            status: status_from_row(row, "tasks")?,
            category_id: row.get("category_id")?,
            category_name: row.get("category_name")?,
            priority_id: row.get("priority_id")?,
            priority_name: row.get("priority_name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

static SUBTASK_TABLE: TableSpec = TableSpec {
    table: "subtasks",
    select_sql: "SELECT subtasks.id, subtasks.task_id, tasks.title AS task_title, \
                 subtasks.title, subtasks.status, subtasks.created_at, subtasks.updated_at \
                 FROM subtasks \
                 INNER JOIN tasks ON tasks.id = subtasks.task_id",
    count_sql: "SELECT COUNT(*) FROM subtasks \
                INNER JOIN tasks ON tasks.id = subtasks.task_id",
    searchable: &["subtasks.title", "subtasks.status", "tasks.title"],
    sortable: &[
        SortKey {
            key: "task__title",
            expr: "tasks.title",
            descending: false,
        },
        SortKey {
            key: "title",
            expr: "subtasks.title",
            descending: false,
        },
        SortKey {
            key: "status",
            expr: "subtasks.status",
            descending: false,
        },
        SortKey {
            key: "created_at",
            expr: "subtasks.created_at",
            descending: false,
        },
        SortKey {
            key: "-created_at",
            expr: "subtasks.created_at",
            descending: true,
        },
    ],
    default_order: &["subtasks.created_at DESC"],
    default_sort_key: "-created_at",
    id_expr: "subtasks.id",
};

static SUBTASK_RELATIONS: [Relation; 1] = [Relation {
    field: "task",
    column: "task_id",
    parent_table: "tasks",
}];

impl EntitySchema for SubTask {
    type Record = SubTask;

    const KIND: EntityKind = EntityKind::SubTask;

    fn table() -> &'static TableSpec {
        &SUBTASK_TABLE
    }

    fn relations() -> &'static [Relation] {
        &SUBTASK_RELATIONS
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let task_id = id_field(form, "task", &mut errors);
        let title = required_text(form, "title", TEXT_MAX_LEN, &mut errors);
        let status = status_field(form, "status", &mut errors);

        let mut values = RowValues::new();
        if let Some(task_id) = task_id {
            values.push("task_id", Value::Integer(task_id));
        }
        if let Some(title) = title {
            values.push("title", Value::Text(title));
        }
        values.push("status", Value::Text(status.as_db().to_string()));
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<SubTask> {
        Ok(SubTask {
            id: row.get("id")?,
            task_id: row.get("task_id")?,
            task_title: row.get("task_title")?,
            title: row.get("title")?,
            status: status_from_row(row, "subtasks")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

static NOTE_TABLE: TableSpec = TableSpec {
    table: "notes",
    select_sql: "SELECT notes.id, notes.task_id, tasks.title AS task_title, \
                 notes.content, notes.created_at, notes.updated_at \
                 FROM notes \
                 INNER JOIN tasks ON tasks.id = notes.task_id",
    count_sql: "SELECT COUNT(*) FROM notes \
                INNER JOIN tasks ON tasks.id = notes.task_id",
    searchable: &["notes.content", "tasks.title"],
    sortable: &[
        SortKey {
            key: "task__title",
            expr: "tasks.title",
            descending: false,
        },
        SortKey {
            key: "content",
            expr: "notes.content",
            descending: false,
        },
        SortKey {
            key: "created_at",
            expr: "notes.created_at",
            descending: false,
        },
        SortKey {
            key: "-created_at",
            expr: "notes.created_at",
            descending: true,
        },
    ],
    default_order: &["notes.created_at DESC"],
    default_sort_key: "-created_at",
    id_expr: "notes.id",
};

static NOTE_RELATIONS: [Relation; 1] = [Relation {
    field: "task",
    column: "task_id",
    parent_table: "tasks",
}];

impl EntitySchema for Note {
    type Record = Note;

    const KIND: EntityKind = EntityKind::Note;

    fn table() -> &'static TableSpec {
        &NOTE_TABLE
    }

    fn relations() -> &'static [Relation] {
        &NOTE_RELATIONS
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let task_id = id_field(form, "task", &mut errors);
        let content = required_text(form, "content", TEXT_MAX_LEN, &mut errors);

        let mut values = RowValues::new();
        if let Some(task_id) = task_id {
            values.push("task_id", Value::Integer(task_id));
        }
        if let Some(content) = content {
            values.push("content", Value::Text(content));
        }
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Note> {
        Ok(Note {
            id: row.get("id")?,
            task_id: row.get("task_id")?,
            task_title: row.get("task_title")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}
