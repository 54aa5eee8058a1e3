// Database repository for users

use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::models::{NewUser, User};
use crate::error::ApiError;

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A taken username surfaces as a validation error.
    async fn create(&self, user: NewUser) -> Result<User, ApiError>;

    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, username, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
