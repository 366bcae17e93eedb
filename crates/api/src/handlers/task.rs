//! Handlers for `/tasks`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tasktrack_core::error::CoreError;
use tasktrack_core::task::validate_task_status;
use tasktrack_core::types::DbId;
use tasktrack_db::models::task::{CreateTask, UpdateTask};
use tasktrack_db::repositories::TaskRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /tasks
///
/// List every task with its category.
pub async fn list_tasks(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tasks = TaskRepo::list_all(&state.pool).await?;
    Ok(Json(tasks))
}

/// GET /tasks/{task_id}
///
/// One task with its category and direct subtasks.
pub async fn get_task(
    State(state): State<AppState>,
    AppPath(task_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    Ok(Json(task))
}

/// POST /tasks
///
/// Create a task, or a subtask when `parentId` is set.
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTask>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &input.status {
        validate_task_status(status)?;
    }

    let task = TaskRepo::create(&state.pool, &input).await?;

    tracing::info!(
        task_id = task.id,
        parent_id = ?task.parent_id,
        user = ?auth.subject,
        "Task created",
    );

    Ok(Json(task))
}

/// POST /tasks/{task_id}
///
/// Update summary, status, description, and/or category. The parent is fixed
/// at creation.
pub async fn update_task(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(task_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTask>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &input.status {
        validate_task_status(status)?;
    }

    let task = TaskRepo::update(&state.pool, task_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    tracing::info!(task_id, user = ?auth.subject, "Task updated");

    Ok(Json(task))
}
