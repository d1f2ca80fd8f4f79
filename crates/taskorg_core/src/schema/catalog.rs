//! Schema descriptors for the two task label entities.
//!
//! Categories and priorities share the same shape: a single required name,
//! searched and sorted on that name.

use crate::model::entities::{Category, Priority};
use crate::model::form::{required_text, FormData, ValidationError};
use crate::repo::RepoResult;
use crate::schema::{EntityKind, EntitySchema, RowValues, SortKey, TableSpec};
use rusqlite::types::Value;
use rusqlite::Row;

const NAME_MAX_LEN: usize = 50;

static CATEGORY_TABLE: TableSpec = TableSpec {
    table: "categories",
    select_sql: "SELECT categories.id, categories.name, categories.created_at, \
                 categories.updated_at FROM categories",
    count_sql: "SELECT COUNT(*) FROM categories",
    searchable: &["categories.name"],
    sortable: &[SortKey {
        key: "name",
        expr: "categories.name",
        descending: false,
    }],
    default_order: &["categories.name ASC"],
    default_sort_key: "name",
    id_expr: "categories.id",
};

impl EntitySchema for Category {
    type Record = Category;

    const KIND: EntityKind = EntityKind::Category;

    fn table() -> &'static TableSpec {
        &CATEGORY_TABLE
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let name = required_text(form, "name", NAME_MAX_LEN, &mut errors);

        let mut values = RowValues::new();
        if let Some(name) = name {
            values.push("name", Value::Text(name));
        }
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Category> {
        Ok(Category {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

static PRIORITY_TABLE: TableSpec = TableSpec {
    table: "priorities",
    select_sql: "SELECT priorities.id, priorities.name, priorities.created_at, \
                 priorities.updated_at FROM priorities",
    count_sql: "SELECT COUNT(*) FROM priorities",
    searchable: &["priorities.name"],
    sortable: &[SortKey {
        key: "name",
        expr: "priorities.name",
        descending: false,
    }],
    default_order: &["priorities.name ASC"],
    default_sort_key: "name",
    id_expr: "priorities.id",
};

impl EntitySchema for Priority {
    type Record = Priority;

    const KIND: EntityKind = EntityKind::Priority;

    fn table() -> &'static TableSpec {
        &PRIORITY_TABLE
    }

    fn validate(form: &FormData) -> Result<RowValues, ValidationError> {
        let mut errors = ValidationError::new();
        let name = required_text(form, "name", NAME_MAX_LEN, &mut errors);

        let mut values = RowValues::new();
        if let Some(name) = name {
            values.push("name", Value::Text(name));
        }
        errors.into_result(values)
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Priority> {
        Ok(Priority {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}
