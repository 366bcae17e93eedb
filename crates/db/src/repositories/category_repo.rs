//! Repository for the `categories` table.

use sqlx::PgPool;
use tasktrack_core::types::DbId;

use crate::models::category::{Category, CategoryInfo, CreateCategory, UpdateCategory};

/// Column list for full `categories` rows.
const COLUMNS: &str = "id, name, color, created_at, updated_at";

/// Column list for the `{id, name, color}` projection.
const INFO_COLUMNS: &str = "id, name, color";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, color) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CategoryInfo>, sqlx::Error> {
        let query = format!("SELECT {INFO_COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, CategoryInfo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all categories in insertion order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<CategoryInfo>, sqlx::Error> {
        let query = format!("SELECT {INFO_COLUMNS} FROM categories ORDER BY id");
        sqlx::query_as::<_, CategoryInfo>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a category's `name` and/or `color`.
    ///
    /// Returns `None` if no category with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET \
                 name = COALESCE($2, name), \
                 color = COALESCE($3, color), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }
}
