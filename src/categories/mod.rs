// Category management: admin-only CRUD

pub mod handlers;
pub mod models;
pub mod repository;

use axum::{
    middleware::from_fn_with_state,
    routing::{post, put},
    Router,
};

use crate::auth::{require_admin, SessionManager};
use crate::AppState;

pub use handlers::*;
pub use models::*;
pub use repository::*;

/// Routes mounted at /api/category, all admin only
pub fn routes(sessions: &SessionManager) -> Router<AppState> {
    Router::new()
        .route("/", post(create_category_handler).get(list_categories_handler))
        .route(
            "/:id",
            put(update_category_handler).delete(delete_category_handler),
        )
        .route_layer(from_fn_with_state(sessions.clone(), require_admin))
}
