//! Dashboard aggregation for the landing view.
//!
//! # Responsibility
//! - Compute total and current-calendar-year row counts for the five
//!   primary entity types.
//!
//! # Invariants
//! - Counts are independent queries; no entity's count depends on another's.
//! - No filtering, no pagination.

use crate::controller::{Controller, ControllerError};
use crate::guard::RequestContext;
use crate::model::entities::{Category, Note, Priority, SubTask, Task};
use crate::repo::store::SqliteStore;
use crate::repo::RepoResult;
use crate::schema::EntitySchema;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

/// Counts for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub total: u64,
    pub created_this_year: u64,
}

/// Summary counts across the five primary entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub categories: EntityCounts,
    pub priorities: EntityCounts,
    pub tasks: EntityCounts,
    pub subtasks: EntityCounts,
    pub notes: EntityCounts,
}

impl Controller<'_> {
    /// Computes the landing-view summary counts.
    pub fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardCounts, ControllerError> {
        ctx.require_identity()?;
        Ok(counts(self.store())?)
    }
}

/// Counts anchored at the current moment.
pub fn counts(store: &SqliteStore<'_>) -> RepoResult<DashboardCounts> {
    counts_at(store, Utc::now())
}

/// Counts with the calendar-year window anchored at `now` (UTC).
///
/// Split out so tests can pin the clock.
pub fn counts_at(store: &SqliteStore<'_>, now: DateTime<Utc>) -> RepoResult<DashboardCounts> {
    let (year_start, year_end) = year_window(now);
    Ok(DashboardCounts {
        categories: entity_counts::<Category>(store, year_start, year_end)?,
        priorities: entity_counts::<Priority>(store, year_start, year_end)?,
        tasks: entity_counts::<Task>(store, year_start, year_end)?,
        subtasks: entity_counts::<SubTask>(store, year_start, year_end)?,
        notes: entity_counts::<Note>(store, year_start, year_end)?,
    })
}

fn entity_counts<E: EntitySchema>(
    store: &SqliteStore<'_>,
    year_start: i64,
    year_end: i64,
) -> RepoResult<EntityCounts> {
    Ok(EntityCounts {
        total: store.count::<E>()?,
        created_this_year: store.count_created_between::<E>(year_start, year_end)?,
    })
}

/// `[start, end)` of the calendar year containing `now`, in epoch ms.
fn year_window(now: DateTime<Utc>) -> (i64, i64) {
    let year = now.year();
    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map_or(0, |moment| moment.timestamp_millis());
    let end = Utc
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .single()
        .map_or(i64::MAX, |moment| moment.timestamp_millis());
    (start, end)
}
