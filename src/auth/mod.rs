// Authentication module
// Session-based authentication: registration, login, session checks and role gating

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod session;
pub mod store;

use axum::{routing::post, Router};

use crate::AppState;

// Re-export commonly used types
pub use handlers::{check_handler, login_handler, logout_handler, register_handler};
pub use middleware::{require_admin, require_any, CurrentSession, RequireRole};
pub use models::{LoginRequest, RegisterRequest, Role, User, UserResponse};
pub use password::PasswordHasher;
pub use repository::{PgUserRepository, UserRepository};
pub use service::AuthService;
pub use session::{Session, SessionManager};
pub use store::{MemorySessionStore, RedisSessionStore, SessionError, SessionStore};

/// Routes mounted at /api/auth
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route(
            "/",
            post(login_handler).get(check_handler).delete(logout_handler),
        )
}
