//! Per-entity schema descriptors.
//!
//! # Responsibility
//! - Declare, once per entity, everything the generic store and controller
//!   need: table/select SQL, route slug, relation rules, searchable and
//!   sortable whitelists, default ordering, row decoding, form validation.
//!
//! # Invariants
//! - Sort keys outside the declared whitelist silently fall back to the
//!   declared default ordering.
//! - `validate` is pure over the submitted map; foreign-key existence is
//!   checked by the store at write time.
//! - Ordering declarations always end deterministically; the store appends
//!   the id tie-breaker.

use crate::model::form::{FormData, ValidationError};
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;

mod catalog;
mod programs;
mod tasks;

/// Discriminant for every entity type the core manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Priority,
    Task,
    SubTask,
    Note,
    College,
    Program,
}

impl EntityKind {
    /// Primary route segment for this entity.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Priority => "priorities",
            Self::Task => "tasks",
            Self::SubTask => "subtasks",
            Self::Note => "notes",
            Self::College => "colleges",
            Self::Program => "programs",
        }
    }

    /// Human-readable singular name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Priority => "priority",
            Self::Task => "task",
            Self::SubTask => "subtask",
            Self::Note => "note",
            Self::College => "college",
            Self::Program => "program",
        }
    }
}

/// One whitelisted sort key: wire name to SQL expression.
///
/// A leading `-` in `key` (e.g. `-created_at`) marks the descending variant;
/// the direction is precomputed in `descending`.
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub key: &'static str,
    pub expr: &'static str,
    pub descending: bool,
}

/// Foreign-key rule checked by the store before every write.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// Form field name carrying the parent id.
    pub field: &'static str,
    /// Column holding the parent id.
    pub column: &'static str,
    /// Parent table the id must exist in.
    pub parent_table: &'static str,
}

/// Static query surface of one entity table.
pub struct TableSpec {
    pub table: &'static str,
    /// Full select with joined parent display columns.
    pub select_sql: &'static str,
    /// Count over the same join tree, so search predicates stay valid.
    pub count_sql: &'static str,
    /// SQL expressions matched by the case-insensitive search predicate.
    pub searchable: &'static [&'static str],
    /// Whitelisted sort keys.
    pub sortable: &'static [SortKey],
    /// Default ordering tuple applied when `sort_by` is absent or unknown.
    pub default_order: &'static [&'static str],
    /// Sort key echoed to the caller when the default ordering applies.
    pub default_sort_key: &'static str,
    /// Qualified id column used as the final ordering tie-breaker.
    pub id_expr: &'static str,
}

/// Validated column values ready for insert/update.
#[derive(Debug, Clone, Default)]
pub struct RowValues {
    columns: Vec<(&'static str, Value)>,
}

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &'static str, value: Value) {
        self.columns.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Value)> {
        self.columns.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Schema descriptor implemented once per entity.
///
/// The generic store and controller are parameterized by this trait instead
/// of duplicating the List/Create/Update/Delete contract per entity.
pub trait EntitySchema {
    /// Read model returned by the store, including joined display fields.
    type Record: Serialize + Clone + std::fmt::Debug;

    const KIND: EntityKind;

    /// Static table/query declaration.
    fn table() -> &'static TableSpec;

    /// Foreign-key rules enforced at write time.
    fn relations() -> &'static [Relation] {
        &[]
    }

    /// Validates a submitted field-value map into column values.
    ///
    /// Collects every field failure; performs no store access.
    fn validate(form: &FormData) -> Result<RowValues, ValidationError>;

    /// Decodes one row of `select_sql` into the read model.
    ///
    /// Rejects invalid persisted state (e.g. an unknown status spelling)
    /// instead of masking it.
    fn from_row(row: &Row<'_>) -> RepoResult<Self::Record>;
}
