// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Coarse permission class carried by users and sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    /// Every known role, in declaration order
    pub const ALL: [Role; 2] = [Role::Admin, Role::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User database model
/// Never serialized: the password hash must not leave the server
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada")]
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
        }
    }
}

/// Registration request DTO
/// A role cannot be requested: registered users are always clients
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(required, length(min = 1, message = "Name is required"))]
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[validate(required, length(min = 1, message = "Username is required"))]
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[validate(required, length(min = 1, message = "Password is required"))]
    #[schema(example = "correct horse")]
    pub password: Option<String>,
}

/// Login request DTO
/// Missing fields deserialize as empty strings and simply fail to match
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "ada")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "correct horse")]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format_and_display() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert_eq!(serde_json::from_str::<Role>(r#""client""#).unwrap(), Role::Client);
        assert!(serde_json::from_str::<Role>(r#""root""#).is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::default(), Role::Client);
    }

    #[test]
    fn test_user_response_has_no_password() {
        let user = User {
            id: 7,
            name: "Ada".to_string(),
            username: "ada".to_string(),
            password_hash: "deadbeef".to_string(),
            role: Role::Client,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(json["id"], 7);
        assert_eq!(json["username"], "ada");
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
    }

    #[test]
    fn test_register_request_requires_all_fields() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"username": "ada", "password": "pw"}"#).unwrap();
        assert!(request.validate().is_err());

        let request: RegisterRequest =
            serde_json::from_str(r#"{"name": "", "username": "ada", "password": "pw"}"#).unwrap();
        assert!(request.validate().is_err());

        let request: RegisterRequest =
            serde_json::from_str(r#"{"name": "Ada", "username": "ada", "password": "pw"}"#)
                .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_ignores_role() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"name": "Ada", "username": "ada", "password": "pw", "role": "admin"}"#,
        )
        .unwrap();
        assert_eq!(request.username.as_deref(), Some("ada"));
    }

    #[test]
    fn test_login_request_missing_fields_default_to_empty() {
        let request: LoginRequest = serde_json::from_str(r#"{"username": "ada"}"#).unwrap();
        assert_eq!(request.username, "ada");
        assert_eq!(request.password, "");
    }
}
