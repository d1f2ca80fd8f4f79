//! Entity record structs.
//!
//! # Responsibility
//! - Define the read models returned by the entity store, including joined
//!   parent display fields (category/priority names, parent task title).
//! - Define the shared task/subtask lifecycle enumeration.
//!
//! # Invariants
//! - `created_at` is set once at creation and never changes; `updated_at`
//!   is refreshed on every mutation. Both are epoch milliseconds.
//! - `Status` round-trips through its exact stored spelling, including the
//!   lowercase "progress" in `In progress`.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier for every entity row.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EntityId = i64;

/// Lifecycle state shared by tasks and subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    #[serde(rename = "In progress")]
    InProgress,
    Completed,
}

impl Status {
    /// Stored/wire spelling of this status.
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }

    /// Parses the stored/wire spelling. Returns `None` for non-members.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "In progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Pending
    }
}

/// Task grouping label. Referenced by tasks; deleting a category deletes
/// the tasks referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Task urgency label. Same delete rule as [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: EntityId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Central work item. Belongs to exactly one category and one priority;
/// owns subtasks and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// Due moment in epoch milliseconds.
    pub deadline: i64,
    pub status: Status,
    pub category_id: EntityId,
    /// Joined display field from the referenced category.
    pub category_name: String,
    pub priority_id: EntityId,
    /// Joined display field from the referenced priority.
    pub priority_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Child work item of a task; deleted together with its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: EntityId,
    pub task_id: EntityId,
    /// Joined display field from the parent task.
    pub task_title: String,
    pub title: String,
    pub status: Status,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Free-text annotation on a task; deleted together with its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub task_id: EntityId,
    /// Joined display field from the parent task.
    pub task_title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Secondary hierarchy root. Referenced by programs with set-null semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub id: EntityId,
    pub college_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Program record; also served under the `organizations` route alias.
///
/// `prog_name` and `description` are optional form fields stored as empty
/// strings when blank. `college_id` is nullable and nulled out when the
/// referenced college is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: EntityId,
    pub name: String,
    pub prog_name: String,
    pub description: String,
    pub college_id: Option<EntityId>,
    /// Joined display field from the referenced college, when set.
    pub college_name: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
