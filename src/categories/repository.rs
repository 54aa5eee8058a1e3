use async_trait::async_trait;
use sqlx::PgPool;

use crate::categories::Category;
use crate::error::ApiError;

/// Category persistence
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a category. A taken name surfaces as a validation error.
    async fn create(&self, name: &str) -> Result<Category, ApiError>;

    /// All categories ordered by id
    async fn list(&self) -> Result<Vec<Category>, ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ApiError>;

    /// Categories with the given ids; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError>;

    /// Rename a category, returning None when it does not exist
    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>, ApiError>;

    /// Delete a category, returning whether a row was removed.
    /// Products referencing it are left in place.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

/// PostgreSQL-backed category repository
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn list(&self) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Category>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
