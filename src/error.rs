// Error handling module for the shop API
// Provides the single error taxonomy and its HTTP response conversion

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::store::SessionError;

/// Main error type for the API
/// All handlers, services and repositories return Result<T, ApiError>
///
/// Each variant maps to a stable error name, a fixed client message and an
/// HTTP status. `details` carry diagnostic context that is logged but never
/// sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required field, uniqueness violation or malformed input
    #[error("Invalid data received.")]
    Validation { details: Option<String> },

    /// Login credentials don't match any user
    #[error("Username does not exist or password didn't match.")]
    Authentication,

    /// Session check without an active session
    #[error("Not authenticated.")]
    NotAuthenticated,

    /// No session, or the session role is not allowed on the route
    #[error("Not authenticated or unauthorized role.")]
    Unauthorized,

    #[error("The category was not found.")]
    CategoryNotFound,

    #[error("The product was not found.")]
    ProductNotFound,

    /// Unmatched route
    #[error("Not found.")]
    NotFound,

    /// Database operation errors
    /// Sensitive details are filtered from client responses
    #[error("Internal server error.")]
    Database(#[source] sqlx::Error),

    /// Session store failures (store unreachable, corrupt record)
    #[error("Internal server error.")]
    SessionStore(#[source] SessionError),

    /// Any other unexpected failure
    #[error("Internal server error.")]
    Internal(String),
}

impl ApiError {
    /// Validation error carrying a diagnostic detail for the logs
    pub fn validation(details: impl Into<String>) -> Self {
        ApiError::Validation {
            details: Some(details.into()),
        }
    }

    /// Stable, machine-checkable error name
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "ValidationError",
            ApiError::Authentication => "AuthenticationError",
            ApiError::NotAuthenticated => "NotAuthenticatedError",
            ApiError::Unauthorized => "UnauthorizedError",
            ApiError::CategoryNotFound => "CategoryNotFoundError",
            ApiError::ProductNotFound => "ProductNotFoundError",
            ApiError::NotFound => "NotFoundError",
            ApiError::Database(_) | ApiError::SessionStore(_) | ApiError::Internal(_) => {
                "InternalServerError"
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Authentication | ApiError::NotAuthenticated | ApiError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::CategoryNotFound | ApiError::ProductNotFound | ApiError::NotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Database(_) | ApiError::SessionStore(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Diagnostic context attached to the error, if any
    pub fn details(&self) -> Option<String> {
        match self {
            ApiError::Validation { details } => details.clone(),
            ApiError::Database(e) => Some(format!("{:?}", e)),
            ApiError::SessionStore(e) => Some(e.to_string()),
            ApiError::Internal(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    /// Client-facing body: "{Name}: {message}"
    pub fn body(&self) -> String {
        format!("{}: {}", self.name(), self)
    }

    /// Logs the error at a level matching its severity:
    /// - error!: 500-level failures, with their cause
    /// - warn!: authentication and authorization failures
    /// - debug!: expected client errors (validation, not found)
    fn log(&self) {
        let details = self
            .details()
            .map(|d| format!("\n\t{}", d))
            .unwrap_or_default();

        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => error!("{}{}", self.body(), details),
            StatusCode::UNAUTHORIZED => warn!("{}{}", self.body(), details),
            _ => debug!("{}{}", self.body(), details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.body(),
        )
            .into_response()
    }
}

/// Convert sqlx errors to ApiError
/// Constraint violations are client errors; everything else is internal
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.is_unique_violation()
                || db_err.is_check_violation()
                || db_err.is_foreign_key_violation()
            {
                return ApiError::validation(db_err.message().to_string());
            }
        }
        ApiError::Database(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::validation(errors.to_string())
    }
}

/// Malformed or missing JSON bodies are validation failures
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Non-numeric ids in the path are validation failures
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        ApiError::SessionStore(error)
    }
}

/// Fallback handler for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
