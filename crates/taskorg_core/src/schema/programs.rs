//! Schema descriptors for the program/college hierarchy.
//!
//! Programs are also served under the `organizations` route alias; both
//! names resolve to this one descriptor. The college reference is optional
//! and nulled out (not cascaded) when the college is deleted.

use crate::model::entities::{College, Program};
use crate::model::form::{optional_id_field, optional_text, required_text, FormData, ValidationError};
use crate::repo::RepoResult;
use crate::schema::{EntityKind, EntitySchema, Relation, RowValues, SortKey, TableSpec};
use rusqlite::types::Value;
use rusqlite::Row;

const NAME_MAX_LEN: usize = 120;

static COLLEGE_TABLE: TableSpec = TableSpec {
    table: "colleges",
    select_sql: "SELECT colleges.id, colleges.college_name, colleges.created_at, \
                 colleges.updated_at FROM colleges",
    count_sql: "SELECT COUNT(*) FROM colleges",
    searchable: &["colleges.college_name"],
    sortable: &[SortKey {
        key: "college_name",
        expr: "colleges.college_name",
        descending: false,
    }],
    default_order: &["colleges.college_name ASC"],
    default_sort_key: "college_name",
    id_expr: "colleges.id",
};

impl EntitySchema for College {
    type Record = College;

    const KIND: EntityKind = EntityKind::College;

    fn table() -> &'static TableSpec {
        &COLLEGE_TABLE
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let college_name = required_text(form, "college_name", NAME_MAX_LEN, &mut errors);

        let mut values = RowValues::new();
        if let Some(college_name) = college_name {
            values.push("college_name", Value::Text(college_name));
        }
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<College> {
        Ok(College {
            id: row.get("id")?,
            college_name: row.get("college_name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

static PROGRAM_TABLE: TableSpec = TableSpec {
    table: "programs",
    select_sql: "SELECT programs.id, programs.name, programs.prog_name, \
                 programs.description, programs.college_id, \
                 colleges.college_name AS college_name, \
                 programs.created_at, programs.updated_at \
                 FROM programs \
                 LEFT JOIN colleges ON colleges.id = programs.college_id",
    count_sql: "SELECT COUNT(*) FROM programs \
                LEFT JOIN colleges ON colleges.id = programs.college_id",
    searchable: &["programs.name", "programs.description"],
    sortable: &[
        SortKey {
            key: "name",
            expr: "programs.name",
            descending: false,
        },
        SortKey {
            key: "prog_name",
            expr: "programs.prog_name",
            descending: false,
        },
        SortKey {
            key: "college__college_name",
            expr: "colleges.college_name",
            descending: false,
        },
    ],
    default_order: &["colleges.college_name ASC", "programs.name ASC"],
    default_sort_key: "college__college_name",
    id_expr: "programs.id",
};

static PROGRAM_RELATIONS: [Relation; 1] = [Relation {
    field: "college",
    column: "college_id",
    parent_table: "colleges",
}];

impl EntitySchema for Program {
    type Record = Program;

    const KIND: EntityKind = EntityKind::Program;

    fn table() -> &'static TableSpec {
        &PROGRAM_TABLE
    }

    fn relations() -> &'static [Relation] {
        &PROGRAM_RELATIONS
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let name = required_text(form, "name", NAME_MAX_LEN, &mut errors);
        let prog_name = optional_text(form, "prog_name", NAME_MAX_LEN, &mut errors);
        // Unbounded text field; max_len 0 disables the length cap.
        let description = optional_text(form, "description", 0, &mut errors);
        let college_id = optional_id_field(form, "college", &mut errors);

        let mut values = RowValues::new();
        if let Some(name) = name {
            values.push("name", Value::Text(name));
        }
        values.push("prog_name", Value::Text(prog_name));
        values.push("description", Value::Text(description));
        values.push(
            "college_id",
            college_id.map_or(Value::Null, Value::Integer),
        );
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Program> {
        Ok(Program {
            id: row.get("id")?,
            name: row.get("name")?,
            prog_name: row.get("prog_name")?,
            description: row.get("description")?,
            college_id: row.get("college_id")?,
            college_name: row.get("college_name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}
