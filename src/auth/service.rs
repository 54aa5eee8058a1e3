// Authentication service - business logic layer

use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    models::{LoginRequest, NewUser, RegisterRequest, Role, User},
    password::PasswordHasher,
    repository::UserRepository,
};
use crate::config::AdminBootstrap;
use crate::error::ApiError;

/// Registration, credential checks and admin provisioning
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Register a new client user
    ///
    /// # Errors
    /// - `Validation` if a field is missing or empty, or the username is taken
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        request.validate()?;

        let (Some(name), Some(username), Some(password)) =
            (request.name, request.username, request.password)
        else {
            return Err(ApiError::validation("name, username and password are required"));
        };

        let user = self
            .users
            .create(NewUser {
                name,
                username,
                password_hash: self.hasher.hash(&password),
                role: Role::Client,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Check credentials
    ///
    /// Unknown usernames and wrong passwords fail identically so the response
    /// never reveals which usernames exist.
    pub async fn login(&self, request: LoginRequest) -> Result<User, ApiError> {
        let user = self.users.find_by_username(&request.username).await?;

        match user {
            Some(user) if self.hasher.verify(&user, &request.password) => {
                tracing::debug!("User {} logged in", user.id);
                Ok(user)
            }
            _ => Err(ApiError::Authentication),
        }
    }

    /// Create the bootstrap admin unless the username is already taken.
    /// Returns the created user, or None when it already existed.
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> Result<Option<User>, ApiError> {
        if self.users.find_by_username(&admin.username).await?.is_some() {
            tracing::debug!("Admin account '{}' already present", admin.username);
            return Ok(None);
        }

        let user = self
            .users
            .create(NewUser {
                name: admin.name.clone(),
                username: admin.username.clone(),
                password_hash: self.hasher.hash(&admin.password),
                role: Role::Admin,
            })
            .await?;

        tracing::info!("Created admin account '{}'", user.username);
        Ok(Some(user))
    }
}
