use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::pagination::PageWindow;
use crate::products::{NewProduct, Product, ProductPatch};

/// Detail logged when a product points at a category that does not exist
pub const INVALID_CATEGORY: &str = "Invalid category ID.";

/// Product persistence
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product. A taken name surfaces as a validation error.
    async fn create(&self, product: NewProduct) -> Result<Product, ApiError>;

    /// One window of products ordered by id, plus the total matching count
    async fn page(
        &self,
        category_id: Option<i32>,
        window: PageWindow,
    ) -> Result<(Vec<Product>, i64), ApiError>;

    /// Fetch, patch and persist a product atomically.
    ///
    /// Returns None when the product does not exist, and a validation error
    /// when the resulting category id does not reference a category.
    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Option<Product>, ApiError>;

    /// Delete a product, returning whether a row was removed
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;
}

/// PostgreSQL-backed product repository
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, ApiError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, category_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, category_id, created_at, updated_at
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn page(
        &self,
        category_id: Option<i32>,
        window: PageWindow,
    ) -> Result<(Vec<Product>, i64), ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::INT IS NULL OR category_id = $1)
            "#,
        )
        .bind(category_id)
        .fetch_one(&self.pool);

        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, category_id, created_at, updated_at
            FROM products
            WHERE ($1::INT IS NULL OR category_id = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category_id)
        .bind(window.size)
        .bind(window.offset)
        .fetch_all(&self.pool);

        let (count, rows) = tokio::try_join!(count, rows)?;
        Ok((rows, count))
    }

    async fn update(&self, id: i32, patch: ProductPatch) -> Result<Option<Product>, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, category_id, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };
        let merged = patch.apply(&current);

        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(merged.category_id)
        .fetch_one(&mut *tx)
        .await?;

        if !category_exists {
            return Err(ApiError::validation(INVALID_CATEGORY));
        }

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, price = $3, category_id = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price, category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&merged.name)
        .bind(merged.price)
        .bind(merged.category_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
