//! Handlers for `/categories`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tasktrack_core::category::validate_color;
use tasktrack_core::error::CoreError;
use tasktrack_core::types::DbId;
use tasktrack_db::models::category::{CreateCategory, UpdateCategory};
use tasktrack_db::repositories::{CategoryRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list_all(&state.pool).await?;
    Ok(Json(categories))
}

/// GET /categories/{category_id}
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    Ok(Json(category))
}

/// GET /categories/{category_id}/tasks
///
/// Top-level tasks in the category. Subtasks never appear here, whatever
/// their own category. An unknown category yields an empty list.
pub async fn list_category_tasks(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let tasks = TaskRepo::list_top_level_for_category(&state.pool, category_id).await?;
    Ok(Json(tasks))
}

/// POST /categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    validate_color(&input.color)?;

    let category = CategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(category_id = category.id, user = ?auth.subject, "Category created");

    Ok(Json(category))
}

/// POST /categories/{category_id}
pub async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(category_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    if let Some(color) = &input.color {
        validate_color(color)?;
    }

    let category = CategoryRepo::update(&state.pool, category_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    tracing::info!(category_id, user = ?auth.subject, "Category updated");

    Ok(Json(category))
}
