//! Route definitions for categories, mounted at `/categories`.

use axum::routing::get;
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

/// ```text
/// GET    /                      -> list_categories
/// POST   /                      -> create_category
/// GET    /{category_id}         -> get_category
/// POST   /{category_id}         -> update_category
/// GET    /{category_id}/tasks   -> list_category_tasks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/{category_id}",
            get(category::get_category).post(category::update_category),
        )
        .route("/{category_id}/tasks", get(category::list_category_tasks))
}
