//! Request dispatch: route → guard → controller → render payload.
//!
//! # Responsibility
//! - Drive one inbound request through the access guard and the generic
//!   controller, producing a render-agnostic payload for the external
//!   rendering collaborator.
//!
//! # Invariants
//! - This module never formats HTML; records cross the rendering boundary
//!   as JSON values.
//! - Requests are handled synchronously; the store is the only shared
//!   mutable resource touched.

use crate::controller::{Controller, ControllerError, FormOutcome, Redirect};
use crate::dashboard::DashboardCounts;
use crate::guard::RequestContext;
use crate::model::entities::{Category, Note, Priority, Program, SubTask, Task};
use crate::model::form::{FormData, ValidationError};
use crate::repo::RepoError;
use crate::routes::{self, Action, Method, RouteMatch};
use crate::schema::{EntityKind, EntitySchema};
use log::debug;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One inbound request, already stripped of transport details.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
    /// Raw query string (no leading `?`).
    pub query: &'a str,
    /// Raw urlencoded body for submit actions.
    pub body: Option<&'a str>,
}

/// Render-agnostic outcome handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Payload {
    Dashboard(DashboardCounts),
    /// List page plus echoed query state.
    List {
        entity: EntityKind,
        items: Vec<serde_json::Value>,
        total_count: u64,
        page: u32,
        page_size: u32,
        q: String,
        sort_by: String,
    },
    /// Create/update form view: blank, pre-filled from a record, or
    /// re-rendered with validation detail and the submitted values.
    Form {
        entity: EntityKind,
        record: Option<serde_json::Value>,
        errors: Option<ValidationError>,
        submitted: Option<FormData>,
    },
    /// Delete confirmation referencing the target row.
    DeleteConfirm {
        entity: EntityKind,
        record: serde_json::Value,
    },
    Redirect(Redirect),
}

#[derive(Debug)]
pub enum DispatchError {
    /// No route matched the method/path pair.
    UnknownRoute { path: String },
    Controller(ControllerError),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoute { path } => write!(f, "no route for `{path}`"),
            Self::Controller(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownRoute { .. } => None,
            Self::Controller(err) => Some(err),
        }
    }
}

impl From<ControllerError> for DispatchError {
    fn from(value: ControllerError) -> Self {
        Self::Controller(value)
    }
}

/// Handles one request end to end.
///
/// Control flow: resolve route → access guard → controller operation →
/// query builder / validation → store → payload.
pub fn dispatch(
    ctx: &RequestContext,
    conn: &Connection,
    request: &Request<'_>,
) -> Result<Payload, DispatchError> {
    let route = routes::resolve(request.method, request.path).ok_or_else(|| {
        DispatchError::UnknownRoute {
            path: request.path.to_string(),
        }
    })?;
    debug!(
        "event=dispatch module=dispatch status=start path={} route={route:?}",
        request.path
    );

    let controller = Controller::new(conn);
    match route {
        RouteMatch::Dashboard => Ok(Payload::Dashboard(controller.dashboard(ctx)?)),
        RouteMatch::Entity { kind, action } => match kind {
            EntityKind::Category => run::<Category>(&controller, ctx, request, action),
            EntityKind::Priority => run::<Priority>(&controller, ctx, request, action),
            EntityKind::Task => run::<Task>(&controller, ctx, request, action),
            EntityKind::SubTask => run::<SubTask>(&controller, ctx, request, action),
            EntityKind::Note => run::<Note>(&controller, ctx, request, action),
            EntityKind::Program => run::<Program>(&controller, ctx, request, action),
            // Colleges never resolve to a route; kept for exhaustiveness.
            EntityKind::College => Err(DispatchError::UnknownRoute {
                path: request.path.to_string(),
            }),
        },
    }
}

fn run<E: EntitySchema>(
    controller: &Controller<'_>,
    ctx: &RequestContext,
    request: &Request<'_>,
    action: Action,
) -> Result<Payload, DispatchError> {
    match action {
        Action::List => {
            let params = routes::parse_list_params(request.query);
            let data = controller.list::<E>(ctx, &params)?;
            let items = data
                .items
                .iter()
                .map(to_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Payload::List {
                entity: E::KIND,
                items,
                total_count: data.total_count,
                page: data.page,
                page_size: data.page_size,
                q: data.q,
                sort_by: data.sort_by,
            })
        }
        Action::CreateForm => {
            controller.blank_form::<E>(ctx)?;
            Ok(Payload::Form {
                entity: E::KIND,
                record: None,
                errors: None,
                submitted: None,
            })
        }
        Action::CreateSubmit => {
            let form = routes::parse_form(request.body.unwrap_or(""));
            form_payload::<E>(controller.create::<E>(ctx, &form)?, None)
        }
        Action::UpdateForm(id) => {
            let record = controller.edit_form::<E>(ctx, id)?;
            Ok(Payload::Form {
                entity: E::KIND,
                record: Some(to_json(&record)?),
                errors: None,
                submitted: None,
            })
        }
        Action::UpdateSubmit(id) => {
            let record = controller.edit_form::<E>(ctx, id)?;
            let form = routes::parse_form(request.body.unwrap_or(""));
            form_payload::<E>(
                controller.update::<E>(ctx, id, &form)?,
                Some(to_json(&record)?),
            )
        }
        Action::DeleteConfirm(id) => {
            let record = controller.delete_confirm::<E>(ctx, id)?;
            Ok(Payload::DeleteConfirm {
                entity: E::KIND,
                record: to_json(&record)?,
            })
        }
        Action::DeleteExecute(id) => Ok(Payload::Redirect(controller.delete::<E>(ctx, id)?)),
    }
}

fn form_payload<E: EntitySchema>(
    outcome: FormOutcome,
    record: Option<serde_json::Value>,
) -> Result<Payload, DispatchError> {
    match outcome {
        FormOutcome::Saved { redirect, .. } => Ok(Payload::Redirect(redirect)),
        FormOutcome::Invalid { errors, submitted } => Ok(Payload::Form {
            entity: E::KIND,
            record,
            errors: Some(errors),
            submitted: Some(submitted),
        }),
    }
}

fn to_json<T: Serialize>(record: &T) -> Result<serde_json::Value, DispatchError> {
    serde_json::to_value(record).map_err(|err| {
        DispatchError::Controller(ControllerError::Repo(RepoError::InvalidData(format!(
            "payload encoding failed: {err}"
        ))))
    })
}
