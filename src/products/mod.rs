// Product management: admin-only mutations, paginated listing for any authenticated user

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::auth::{require_admin, require_any, SessionManager};
use crate::AppState;

pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;

/// Routes mounted at /api/product
pub fn routes(sessions: &SessionManager) -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_product_handler))
        .route(
            "/:id",
            put(update_product_handler).delete(delete_product_handler),
        )
        .route_layer(from_fn_with_state(sessions.clone(), require_admin));

    let any_role = Router::new()
        .route("/", get(list_products_handler))
        .route_layer(from_fn_with_state(sessions.clone(), require_any));

    admin.merge(any_role)
}
