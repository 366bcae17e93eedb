//! Route definitions for tasks, mounted at `/tasks`.

use axum::routing::get;
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// ```text
/// GET    /              -> list_tasks
/// POST   /              -> create_task
/// GET    /{task_id}     -> get_task
/// POST   /{task_id}     -> update_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list_tasks).post(task::create_task))
        .route("/{task_id}", get(task::get_task).post(task::update_task))
}
