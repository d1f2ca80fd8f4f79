//! Entity store layer: error taxonomy and the generic SQLite store.
//!
//! # Responsibility
//! - Define the persistence error taxonomy shared by all entities.
//! - Isolate SQL details from controller/dispatch orchestration.
//!
//! # Invariants
//! - Write paths enforce foreign-key existence before SQL mutations; a
//!   constraint violation that races past the pre-check still surfaces as a
//!   validation error, never as an unhandled failure.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::entities::EntityId;
use crate::model::form::ValidationError;
use crate::schema::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Bad input (including dangling foreign keys); nothing was persisted.
    Validation(ValidationError),
    /// Transport/storage failure.
    Db(DbError),
    /// The targeted row does not exist.
    NotFound { kind: EntityKind, id: EntityId },
    /// Persisted state failed decoding (e.g. unknown status spelling).
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => {
                write!(f, "{} not found: id {id}", kind.display_name())
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
