//! Task models and DTOs.
//!
//! Read paths project different column sets depending on the endpoint, so
//! there is one struct per projection rather than a single wide row.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tasktrack_core::types::{DbId, Timestamp};

use super::category::CategoryInfo;
use super::nullable;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A full row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: DbId,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub category_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw row of a task left-joined with its category.
///
/// The category columns are aliased so they do not collide with the task's
/// own columns; [`TaskWithCategory::from`] folds them into an `Option`.
#[derive(Debug, Clone, FromRow)]
pub struct TaskCategoryRow {
    pub id: DbId,
    pub summary: String,
    pub status: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub joined_category_id: Option<DbId>,
    pub joined_category_name: Option<String>,
    pub joined_category_color: Option<String>,
}

/// A task with its category (or `null`), as returned by `GET /tasks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithCategory {
    pub id: DbId,
    pub summary: String,
    pub status: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub category: Option<CategoryInfo>,
}

impl From<TaskCategoryRow> for TaskWithCategory {
    fn from(row: TaskCategoryRow) -> Self {
        let category = match (
            row.joined_category_id,
            row.joined_category_name,
            row.joined_category_color,
        ) {
            (Some(id), Some(name), Some(color)) => Some(CategoryInfo { id, name, color }),
            _ => None,
        };

        Self {
            id: row.id,
            summary: row.summary,
            status: row.status,
            description: row.description,
            category_id: row.category_id,
            parent_id: row.parent_id,
            category,
        }
    }
}

/// A direct child of a task, nested under `subtasks`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskInfo {
    pub id: DbId,
    pub summary: String,
    pub status: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
}

/// A task with its category and one level of subtasks.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: TaskWithCategory,
    pub subtasks: Vec<SubtaskInfo>,
}

/// A top-level task as listed under `GET /categories/{id}/tasks`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTask {
    pub id: DbId,
    pub summary: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub category_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a task.
///
/// `status` defaults to `"Not started"` when omitted. A non-null `parentId`
/// makes the new task a subtask.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub summary: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub parent_id: Option<DbId>,
}

/// DTO for updating a task. `parentId` is not updatable.
///
/// `categoryId` distinguishes an absent key (keep) from `null` (clear).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub summary: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<DbId>>,
}
