//! List query building: search, sort-key whitelisting, pagination.
//!
//! # Responsibility
//! - Translate a (search text, sort key, page number) request into WHERE /
//!   ORDER BY / LIMIT fragments for an entity's [`TableSpec`].
//! - Keep the total-match count independent of the current page.
//!
//! # Invariants
//! - Page size is fixed at 5 records.
//! - Unknown or absent sort keys fall back to the declared default ordering.
//! - Blank search text disables filtering entirely.
//! - Every ordering ends with the id tie-breaker, so pages are stable.

use crate::schema::TableSpec;
use rusqlite::types::Value;
use serde::Serialize;

/// Fixed page size for every list view.
pub const PAGE_SIZE: u32 = 5;

/// Inbound list request: free-text search, sort key, 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub q: Option<String>,
    pub sort_by: Option<String>,
    pub page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            q: None,
            sort_by: None,
            page: 1,
        }
    }
}

/// One page of results plus the page-independent total match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Number of pages needed for all matches (at least 1, for empty sets).
    pub fn total_pages(&self) -> u64 {
        let size = u64::from(self.page_size.max(1));
        (self.total_count.max(1)).div_ceil(size)
    }
}

/// SQL fragments and binds produced for one list request.
#[derive(Debug)]
pub(crate) struct ListQueryParts {
    /// Empty string or a leading-space `" WHERE …"` fragment.
    pub where_sql: String,
    /// Search binds, one lowercase pattern per searchable expression.
    pub binds: Vec<Value>,
    /// Leading-space `" ORDER BY …"` fragment ending in the id tie-breaker.
    pub order_sql: String,
    pub limit: i64,
    pub offset: i64,
}

/// Returns the sort key the caller should see echoed back: the submitted
/// key when whitelisted, the declared default otherwise.
pub fn effective_sort_key(spec: &TableSpec, sort_by: Option<&str>) -> &'static str {
    sort_by
        .and_then(|submitted| {
            spec.sortable
                .iter()
                .find(|candidate| candidate.key == submitted)
        })
        .map_or(spec.default_sort_key, |candidate| candidate.key)
}

/// Clamps non-positive page input to the first page.
pub(crate) fn normalize_page(page: u32) -> u32 {
    page.max(1)
}

pub(crate) fn build_list_query(spec: &TableSpec, params: &ListParams) -> ListQueryParts {
    let mut where_sql = String::new();
    let mut binds: Vec<Value> = Vec::new();

    let needle = params.q.as_deref().map(str::trim).unwrap_or("");
    if !needle.is_empty() {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        let predicates = spec
            .searchable
            .iter()
            .map(|expr| format!("lower({expr}) LIKE ? ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        where_sql = format!(" WHERE ({predicates})");
        binds.extend(
            std::iter::repeat_with(|| Value::Text(pattern.clone())).take(spec.searchable.len()),
        );
    }

    let mut order_terms: Vec<String> = Vec::new();
    match params
        .sort_by
        .as_deref()
        .and_then(|submitted| spec.sortable.iter().find(|key| key.key == submitted))
    {
        Some(key) => {
            let direction = if key.descending { "DESC" } else { "ASC" };
            order_terms.push(format!("{} {direction}", key.expr));
        }
        None => order_terms.extend(spec.default_order.iter().map(|term| term.to_string())),
    }
    order_terms.push(format!("{} ASC", spec.id_expr));
    let order_sql = format!(" ORDER BY {}", order_terms.join(", "));

    let page = normalize_page(params.page);
    ListQueryParts {
        where_sql,
        binds,
        order_sql,
        limit: i64::from(PAGE_SIZE),
        offset: i64::from(page - 1) * i64::from(PAGE_SIZE),
    }
}

/// Escapes LIKE wildcards so search text matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entities::{Category, Task};
    use crate::schema::EntitySchema;

    #[test]
    fn unknown_sort_key_falls_back_to_default() {
        assert_eq!(
            effective_sort_key(Task::table(), Some("nonsense")),
            "category__name"
        );
        assert_eq!(effective_sort_key(Task::table(), None), "category__name");
        assert_eq!(
            effective_sort_key(Task::table(), Some("-created_at")),
            "-created_at"
        );
    }

    #[test]
    fn default_ordering_is_the_full_declared_tuple() {
        let parts = build_list_query(Task::table(), &ListParams::default());
        assert_eq!(
            parts.order_sql,
            " ORDER BY categories.name ASC, priorities.name ASC, tasks.title ASC, tasks.id ASC"
        );
    }

    #[test]
    fn whitelisted_descending_key_orders_descending() {
        let params = ListParams {
            sort_by: Some("-created_at".to_string()),
            ..ListParams::default()
        };
        let parts = build_list_query(Task::table(), &params);
        assert_eq!(
            parts.order_sql,
            " ORDER BY tasks.created_at DESC, tasks.id ASC"
        );
    }

    #[test]
    fn blank_search_disables_filtering() {
        let params = ListParams {
            q: Some("   ".to_string()),
            ..ListParams::default()
        };
        let parts = build_list_query(Category::table(), &params);
        assert!(parts.where_sql.is_empty());
        assert!(parts.binds.is_empty());
    }

    #[test]
    fn search_binds_one_pattern_per_searchable_field() {
        let params = ListParams {
            q: Some("Work".to_string()),
            ..ListParams::default()
        };
        let parts = build_list_query(Task::table(), &params);
        assert_eq!(parts.binds.len(), Task::table().searchable.len());
        assert!(parts.where_sql.contains("lower(categories.name) LIKE ?"));
        match &parts.binds[0] {
            Value::Text(pattern) => assert_eq!(pattern, "%work%"),
            other => panic!("unexpected bind {other:?}"),
        }
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_done\\x"), "50\\%\\_done\\\\x");
    }

    #[test]
    fn page_clamps_and_offsets() {
        let parts = build_list_query(Category::table(), &ListParams::default());
        assert_eq!((parts.limit, parts.offset), (5, 0));

        let page_three = ListParams {
            page: 3,
            ..ListParams::default()
        };
        let parts = build_list_query(Category::table(), &page_three);
        assert_eq!((parts.limit, parts.offset), (5, 10));

        let zero = ListParams {
            page: 0,
            ..ListParams::default()
        };
        let parts = build_list_query(Category::table(), &zero);
        assert_eq!(parts.offset, 0);
    }

    #[test]
    fn total_pages_rounds_up_and_never_reports_zero() {
        let empty: Page<()> = Page {
            items: Vec::new(),
            total_count: 0,
            page: 1,
            page_size: PAGE_SIZE,
        };
        assert_eq!(empty.total_pages(), 1);

        let six: Page<()> = Page {
            items: Vec::new(),
            total_count: 6,
            page: 1,
            page_size: PAGE_SIZE,
        };
        assert_eq!(six.total_pages(), 2);
    }
}
