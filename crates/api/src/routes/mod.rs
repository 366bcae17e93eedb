pub mod category;
pub mod task;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Body returned for any path no route matches.
pub const NOT_FOUND_MESSAGE: &str = "Content not found! Check your url.";

/// Build the protected route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tasks                          list, create
/// /tasks/{task_id}                get, update (POST)
///
/// /categories                     list, create
/// /categories/{category_id}       get, update (POST)
/// /categories/{category_id}/tasks top-level tasks in the category
/// ```
///
/// Every route requires a valid bearer token. The gate is attached with
/// `route_layer`, so it only runs for requests that matched a route and the
/// fallback stays public.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/tasks", task::router())
        .nest("/categories", category::router())
        .route_layer(from_fn_with_state(state, require_auth))
}

/// Fallback for unmatched paths: fixed plain-text 404.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
}
