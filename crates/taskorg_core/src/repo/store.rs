//! Generic SQLite entity store.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list/count for any [`EntitySchema`],
//!   driven entirely by the entity's schema descriptor.
//! - Stamp `created_at`/`updated_at` on writes.
//!
//! # Invariants
//! - `created_at` is written once and never touched again; `updated_at`
//!   is refreshed on every mutation.
//! - Foreign-key existence is checked before every write; the SQLite
//!   constraint (with `foreign_keys=ON`) backstops races and is reported as
//!   a validation error.
//! - Cascade and set-null delete rules live in the schema DDL; a delete here
//!   is a single atomic statement.

use crate::model::entities::EntityId;
use crate::model::form::ValidationError;
use crate::query::{self, ListParams, Page, PAGE_SIZE};
use crate::repo::{RepoError, RepoResult};
use crate::schema::{EntitySchema, RowValues};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};

/// SQLite-backed store over a migrated connection.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts one validated row and returns the store-assigned id.
    pub fn create<E: EntitySchema>(&self, values: &RowValues) -> RepoResult<EntityId> {
        self.check_relations::<E>(values)?;

        let now = now_ms();
        let mut columns: Vec<&str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        for (column, value) in values.iter() {
            columns.push(column);
            binds.push(value.clone());
        }
        columns.push("created_at");
        binds.push(Value::Integer(now));
        columns.push("updated_at");
        binds.push(Value::Integer(now));

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            E::table().table,
            columns.join(", "),
            placeholders
        );
        self.conn
            .execute(&sql, params_from_iter(binds))
            .map_err(map_write_error)?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Gets one record by id, with joined parent display fields.
    pub fn get<E: EntitySchema>(&self, id: EntityId) -> RepoResult<Option<E::Record>> {
        let spec = E::table();
        let sql = format!("{} WHERE {} = ?;", spec.select_sql, spec.id_expr);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }
        Ok(None)
    }

    /// Replaces the full record and refreshes `updated_at`.
    pub fn update<E: EntitySchema>(&self, id: EntityId, values: &RowValues) -> RepoResult<()> {
        self.check_relations::<E>(values)?;

        let mut assignments: Vec<String> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        for (column, value) in values.iter() {
            assignments.push(format!("{column} = ?"));
            binds.push(value.clone());
        }
        assignments.push("updated_at = ?".to_string());
        binds.push(Value::Integer(now_ms()));
        binds.push(Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?;",
            E::table().table,
            assignments.join(", ")
        );
        let changed = self
            .conn
            .execute(&sql, params_from_iter(binds))
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind: E::KIND, id });
        }
        Ok(())
    }

    /// Removes one row, triggering the schema's cascade/set-null rules.
    pub fn delete<E: EntitySchema>(&self, id: EntityId) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?;", E::table().table);
        let changed = self.conn.execute(&sql, [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind: E::KIND, id });
        }
        Ok(())
    }

    /// Lists one page of records for a search/sort/page request.
    ///
    /// The total count is computed over the same predicate, so it is
    /// invariant across pages; pages beyond the last come back empty.
    pub fn list<E: EntitySchema>(&self, params: &ListParams) -> RepoResult<Page<E::Record>> {
        let spec = E::table();
        let parts = query::build_list_query(spec, params);

        let count_sql = format!("{}{};", spec.count_sql, parts.where_sql);
        let total_count: i64 = self.conn.query_row(
            &count_sql,
            params_from_iter(parts.binds.clone()),
            |row| row.get(0),
        )?;

        let select_sql = format!(
            "{}{}{} LIMIT ? OFFSET ?;",
            spec.select_sql, parts.where_sql, parts.order_sql
        );
        let mut binds = parts.binds;
        binds.push(Value::Integer(parts.limit));
        binds.push(Value::Integer(parts.offset));

        let mut stmt = self.conn.prepare(&select_sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(E::from_row(row)?);
        }

        Ok(Page {
            items,
            total_count: total_count.max(0) as u64,
            page: params.page.max(1),
            page_size: PAGE_SIZE,
        })
    }

    /// Total row count for one entity table.
    pub fn count<E: EntitySchema>(&self) -> RepoResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {};", E::table().table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Row count with `created_at` inside `[start_ms, end_ms)`.
    pub fn count_created_between<E: EntitySchema>(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE created_at >= ? AND created_at < ?;",
            E::table().table
        );
        let count: i64 = self
            .conn
            .query_row(&sql, [start_ms, end_ms], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn check_relations<E: EntitySchema>(&self, values: &RowValues) -> RepoResult<()> {
        let mut errors = ValidationError::new();
        for relation in E::relations() {
            // Null/absent means an optional relation left unset; the NOT NULL
            // constraint on mandatory columns is enforced by validation.
            if let Some(Value::Integer(parent_id)) = values.get(relation.column) {
                if !self.row_exists(relation.parent_table, *parent_id)? {
                    errors.push(
                        relation.field,
                        format!(
                            "references a nonexistent {} (id {parent_id})",
                            relation.parent_table
                        ),
                    );
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RepoError::Validation(errors))
        }
    }

    fn row_exists(&self, table: &str, id: EntityId) -> RepoResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?);");
        let exists: i64 = self.conn.query_row(&sql, [id], |row| row.get(0))?;
        Ok(exists == 1)
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Maps a raced foreign-key constraint failure to a validation error.
fn map_write_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, ref message) = err {
        let is_fk = message
            .as_deref()
            .is_some_and(|text| text.contains("FOREIGN KEY"));
        if failure.code == ErrorCode::ConstraintViolation && is_fk {
            let mut errors = ValidationError::new();
            errors.push("__all__", "a referenced row no longer exists");
            return RepoError::Validation(errors);
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::map_write_error;
    use crate::repo::RepoError;
    use rusqlite::ffi;

    fn sqlite_failure(extended_code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), Some(message.to_string()))
    }

    // The FK pre-check catches dangling references before SQL runs, so the
    // engine-level constraint failure only appears when a parent row vanishes
    // between the check and the write. Exercised here with a synthetic error.
    #[test]
    fn raced_foreign_key_violation_becomes_a_validation_error() {
        let err = sqlite_failure(
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            "FOREIGN KEY constraint failed",
        );
        match map_write_error(err) {
            RepoError::Validation(validation) => {
                assert_eq!(validation.errors.len(), 1);
                assert_eq!(validation.errors[0].field, "__all__");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_constraint_violations_pass_through_as_storage_errors() {
        let err = sqlite_failure(
            ffi::SQLITE_CONSTRAINT_NOTNULL,
            "NOT NULL constraint failed: tasks.title",
        );
        assert!(matches!(map_write_error(err), RepoError::Db(_)));
    }

    #[test]
    fn non_constraint_failures_pass_through_as_storage_errors() {
        let err = sqlite_failure(ffi::SQLITE_BUSY, "database is locked");
        assert!(matches!(map_write_error(err), RepoError::Db(_)));
    }
}
