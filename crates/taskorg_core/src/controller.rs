//! Generic CRUD controller.
//!
//! # Responsibility
//! - Expose the uniform List/Create/Update/Delete contract once, for any
//!   entity schema, instead of one concrete controller per entity.
//! - Enforce the access guard before every operation.
//!
//! # Invariants
//! - Unauthenticated calls fail before any store access.
//! - Validation failures return field-level detail and persist nothing;
//!   they are an outcome, not an error.
//! - Successful create/update/delete redirects to the entity list route.

use crate::guard::{RequestContext, Unauthorized};
use crate::model::entities::EntityId;
use crate::model::form::{FormData, ValidationError};
use crate::query::{self, ListParams};
use crate::repo::store::SqliteStore;
use crate::repo::RepoError;
use crate::schema::{EntityKind, EntitySchema};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request-level error taxonomy. Everything here is recoverable at the
/// request boundary; nothing is process-fatal.
#[derive(Debug)]
pub enum ControllerError {
    /// No valid session; raised before any store access.
    Unauthorized,
    /// The operation targeted a nonexistent id.
    NotFound { kind: EntityKind, id: EntityId },
    /// Store-level failure (transport or invalid persisted state).
    Repo(RepoError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "authentication required"),
            Self::NotFound { kind, id } => {
                write!(f, "{} not found: id {id}", kind.display_name())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Unauthorized> for ControllerError {
    fn from(_: Unauthorized) -> Self {
        Self::Unauthorized
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}

/// List payload: one page plus the echoed query state, so a UI can
/// re-render its controls in sync with the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListData<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    /// Effective search text (empty when none was given).
    pub q: String,
    /// Effective sort key, after whitelist fallback.
    pub sort_by: String,
}

/// Where a successful mutation sends the caller next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    fn to_list(kind: EntityKind) -> Self {
        Self {
            location: format!("/{}/", kind.slug()),
        }
    }
}

/// Outcome of a create/update submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormOutcome {
    /// Persisted; caller should follow the redirect to the list view.
    Saved { id: EntityId, redirect: Redirect },
    /// Rejected; nothing persisted. Carries per-field detail and the
    /// submitted values for form re-rendering.
    Invalid {
        errors: ValidationError,
        submitted: FormData,
    },
}

/// One controller instance serves every entity; operations are
/// parameterized by the entity's schema descriptor.
pub struct Controller<'conn> {
    store: SqliteStore<'conn>,
}

impl<'conn> Controller<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            store: SqliteStore::new(conn),
        }
    }

    /// List one page with search/sort/pagination applied.
    pub fn list<E: EntitySchema>(
        &self,
        ctx: &RequestContext,
        params: &ListParams,
    ) -> Result<ListData<E::Record>, ControllerError> {
        ctx.require_identity()?;

        let page = self.store.list::<E>(params)?;
        let sort_by = query::effective_sort_key(E::table(), params.sort_by.as_deref());
        Ok(ListData {
            items: page.items,
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
            q: params.q.clone().unwrap_or_default(),
            sort_by: sort_by.to_string(),
        })
    }

    /// Guard-only entry for rendering a blank create form.
    pub fn blank_form<E: EntitySchema>(&self, ctx: &RequestContext) -> Result<(), ControllerError> {
        ctx.require_identity()?;
        Ok(())
    }

    /// Loads the record backing an update form.
    pub fn edit_form<E: EntitySchema>(
        &self,
        ctx: &RequestContext,
        id: EntityId,
    ) -> Result<E::Record, ControllerError> {
        ctx.require_identity()?;
        self.load::<E>(id)
    }

    /// Validates and persists a new record.
    pub fn create<E: EntitySchema>(
        &self,
        ctx: &RequestContext,
        form: &FormData,
    ) -> Result<FormOutcome, ControllerError> {
        ctx.require_identity()?;

        let values = match E::validate(form) {
            Ok(values) => values,
            Err(errors) => return Ok(invalid(errors, form)),
        };
        match self.store.create::<E>(&values) {
            Ok(id) => {
                info!(
                    "event=entity_create module=controller status=ok entity={} id={id}",
                    E::KIND.slug()
                );
                Ok(FormOutcome::Saved {
                    id,
                    redirect: Redirect::to_list(E::KIND),
                })
            }
            Err(RepoError::Validation(errors)) => Ok(invalid(errors, form)),
            Err(other) => Err(other.into()),
        }
    }

    /// Validates and persists a full-record update.
    pub fn update<E: EntitySchema>(
        &self,
        ctx: &RequestContext,
        id: EntityId,
        form: &FormData,
    ) -> Result<FormOutcome, ControllerError> {
        ctx.require_identity()?;
        self.load::<E>(id)?;

        let values = match E::validate(form) {
            Ok(values) => values,
            Err(errors) => return Ok(invalid(errors, form)),
        };
        match self.store.update::<E>(id, &values) {
            Ok(()) => {
                info!(
                    "event=entity_update module=controller status=ok entity={} id={id}",
                    E::KIND.slug()
                );
                Ok(FormOutcome::Saved {
                    id,
                    redirect: Redirect::to_list(E::KIND),
                })
            }
            Err(RepoError::Validation(errors)) => Ok(invalid(errors, form)),
            Err(other) => Err(other.into()),
        }
    }

    /// First delete phase: loads the target row for the confirmation view.
    pub fn delete_confirm<E: EntitySchema>(
        &self,
        ctx: &RequestContext,
        id: EntityId,
    ) -> Result<E::Record, ControllerError> {
        ctx.require_identity()?;
        self.load::<E>(id)
    }

    /// Second delete phase: removes the row, triggering cascade/set-null
    /// rules, then redirects to the list view.
    pub fn delete<E: EntitySchema>(
        &self,
        ctx: &RequestContext,
        id: EntityId,
    ) -> Result<Redirect, ControllerError> {
        ctx.require_identity()?;

        self.store.delete::<E>(id)?;
        info!(
            "event=entity_delete module=controller status=ok entity={} id={id}",
            E::KIND.slug()
        );
        Ok(Redirect::to_list(E::KIND))
    }

    /// Direct store access for read-only collaborators (dashboard).
    pub(crate) fn store(&self) -> &SqliteStore<'conn> {
        &self.store
    }

    fn load<E: EntitySchema>(&self, id: EntityId) -> Result<E::Record, ControllerError> {
        self.store
            .get::<E>(id)?
            .ok_or(ControllerError::NotFound { kind: E::KIND, id })
    }
}

fn invalid(errors: ValidationError, form: &FormData) -> FormOutcome {
    FormOutcome::Invalid {
        errors,
        submitted: form.clone(),
    }
}
