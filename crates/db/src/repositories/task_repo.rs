//! Repository for the `tasks` table.
//!
//! Category data is joined in SQL (`LEFT JOIN categories`) and subtasks are
//! loaded with a second query, one level deep.

use sqlx::PgPool;
use tasktrack_core::types::DbId;

use crate::models::task::{
    CategoryTask, CreateTask, SubtaskInfo, Task, TaskCategoryRow, TaskDetail, TaskWithCategory,
    UpdateTask,
};

/// Column list for full `tasks` rows.
const COLUMNS: &str = "\
    id, summary, description, status, category_id, parent_id, \
    created_at, updated_at";

/// Select list for a task joined with its category. Expects aliases `t` and `c`.
const JOINED_COLUMNS: &str = "\
    t.id, t.summary, t.status, t.description, t.category_id, t.parent_id, \
    c.id AS joined_category_id, \
    c.name AS joined_category_name, \
    c.color AS joined_category_color";

/// Status assigned when a create request omits one.
const DEFAULT_STATUS: &str = tasktrack_core::task::STATUS_NOT_STARTED;

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (summary, status, description, category_id, parent_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.summary)
            .bind(input.status.as_deref().unwrap_or(DEFAULT_STATUS))
            .bind(&input.description)
            .bind(input.category_id)
            .bind(input.parent_id)
            .fetch_one(pool)
            .await
    }

    /// List every task with its category.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TaskWithCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM tasks t \
             LEFT JOIN categories c ON c.id = t.category_id \
             ORDER BY t.id"
        );
        let rows = sqlx::query_as::<_, TaskCategoryRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(TaskWithCategory::from).collect())
    }

    /// Find a task by ID together with its category and direct subtasks.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TaskDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM tasks t \
             LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.id = $1"
        );
        let Some(row) = sqlx::query_as::<_, TaskCategoryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let subtasks = Self::list_subtasks(pool, id).await?;

        Ok(Some(TaskDetail {
            task: TaskWithCategory::from(row),
            subtasks,
        }))
    }

    /// List the direct children of a task.
    pub async fn list_subtasks(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<SubtaskInfo>, sqlx::Error> {
        sqlx::query_as::<_, SubtaskInfo>(
            "SELECT id, summary, status, description, parent_id \
             FROM tasks WHERE parent_id = $1 ORDER BY id",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// List top-level tasks (no parent) in a category.
    ///
    /// Subtasks are excluded even when their own `category_id` matches.
    pub async fn list_top_level_for_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<CategoryTask>, sqlx::Error> {
        sqlx::query_as::<_, CategoryTask>(
            "SELECT id, summary, description, parent_id, category_id \
             FROM tasks \
             WHERE category_id = $1 AND parent_id IS NULL \
             ORDER BY id",
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    /// Partially update a task and return it reloaded with category and subtasks.
    ///
    /// Uses `COALESCE` so only provided fields change. `category_id` uses
    /// `Option<Option<_>>` so it can be cleared. Returns `None` if no task
    /// with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<TaskDetail>, sqlx::Error> {
        let category_provided = input.category_id.is_some();
        let category_value = input.category_id.flatten();

        let updated: Option<(DbId,)> = sqlx::query_as(
            "UPDATE tasks SET \
                 summary     = COALESCE($2, summary), \
                 status      = COALESCE($3, status), \
                 description = COALESCE($4, description), \
                 category_id = CASE WHEN $5 THEN $6 ELSE category_id END, \
                 updated_at  = NOW() \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(&input.summary)
        .bind(&input.status)
        .bind(&input.description)
        .bind(category_provided)
        .bind(category_value)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(_) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }
}
