//! Routing surface and query-string parsing.
//!
//! # Responsibility
//! - Resolve method + path into an entity operation, reproducing the
//!   original URL layout 1:1 per entity:
//!   `GET /{entity}/`, `GET,POST /{entity}/add/`, `GET,POST /{entity}/{id}/`,
//!   `GET,POST /{entity}/{id}/delete/`, plus `GET /` for the dashboard.
//! - Parse `q`, `sort_by` and `page` query parameters and urlencoded form
//!   bodies.
//!
//! # Invariants
//! - `organizations` is an accepted alias slug for the program entity.
//! - Invalid or non-positive `page` input clamps to the first page.

use crate::model::entities::EntityId;
use crate::model::form::FormData;
use crate::query::ListParams;
use crate::schema::EntityKind;
use percent_encoding::percent_decode_str;

/// Request method; the core only distinguishes form render from submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Operation selected by the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    CreateForm,
    CreateSubmit,
    UpdateForm(EntityId),
    UpdateSubmit(EntityId),
    DeleteConfirm(EntityId),
    DeleteExecute(EntityId),
}

/// Resolved route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch {
    Dashboard,
    Entity { kind: EntityKind, action: Action },
}

/// Maps a route segment to its entity type.
///
/// Colleges have no routing surface (managed via the external admin panel).
pub fn entity_for_slug(slug: &str) -> Option<EntityKind> {
    match slug {
        "categories" => Some(EntityKind::Category),
        "priorities" => Some(EntityKind::Priority),
        "tasks" => Some(EntityKind::Task),
        "subtasks" => Some(EntityKind::SubTask),
        "notes" => Some(EntityKind::Note),
        "programs" | "organizations" => Some(EntityKind::Program),
        _ => None,
    }
}

/// Resolves method + path into an operation; `None` means no such route.
pub fn resolve(method: Method, path: &str) -> Option<RouteMatch> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return match method {
            Method::Get => Some(RouteMatch::Dashboard),
            Method::Post => None,
        };
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    let kind = entity_for_slug(segments[0])?;
    let action = match segments[1..] {
        [] => match method {
            Method::Get => Action::List,
            Method::Post => return None,
        },
        ["add"] => match method {
            Method::Get => Action::CreateForm,
            Method::Post => Action::CreateSubmit,
        },
        [id] => {
            let id = parse_id(id)?;
            match method {
                Method::Get => Action::UpdateForm(id),
                Method::Post => Action::UpdateSubmit(id),
            }
        }
        [id, "delete"] => {
            let id = parse_id(id)?;
            match method {
                Method::Get => Action::DeleteConfirm(id),
                Method::Post => Action::DeleteExecute(id),
            }
        }
        _ => return None,
    };

    Some(RouteMatch::Entity { kind, action })
}

/// Parses a query string into list parameters.
///
/// Empty `q` disables filtering; unknown `sort_by` is passed through for the
/// query builder's whitelist fallback; bad `page` clamps to 1.
pub fn parse_list_params(query: &str) -> ListParams {
    let pairs = parse_pairs(query);
    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let q = lookup("q").filter(|value| !value.trim().is_empty());
    let sort_by = lookup("sort_by").filter(|value| !value.is_empty());
    let page = lookup("page")
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1);

    ListParams { q, sort_by, page }
}

/// Parses an `application/x-www-form-urlencoded` body into form data.
///
/// Later duplicates win, matching how the original forms behaved.
pub fn parse_form(body: &str) -> FormData {
    parse_pairs(body).into_iter().collect()
}

fn parse_id(raw: &str) -> Option<EntityId> {
    raw.parse::<EntityId>().ok().filter(|id| *id > 0)
}

/// Pairs whose key or value decodes to invalid UTF-8 are dropped, never
/// substituted.
fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((key, value)) => Some((decode_component(key)?, decode_component(value)?)),
            None => Some((decode_component(pair)?, String::new())),
        })
        .collect()
}

/// Decodes one urlencoded component: `+` means space, percent escapes are
/// resolved, invalid UTF-8 yields `None`.
fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
