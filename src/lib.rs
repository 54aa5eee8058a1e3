// Shop admin API: session authentication, role gating, categories and paginated products

pub mod auth;
pub mod categories;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod products;
pub mod validation;

#[cfg(test)]
mod testing;

use axum::{
    extract::{FromRef, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, SessionManager};
use categories::CategoryRepository;
use products::ProductService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::check_handler,
        auth::handlers::logout_handler,
        categories::handlers::create_category_handler,
        categories::handlers::list_categories_handler,
        categories::handlers::update_category_handler,
        categories::handlers::delete_category_handler,
        products::handlers::create_product_handler,
        products::handlers::list_products_handler,
        products::handlers::update_product_handler,
        products::handlers::delete_product_handler,
    ),
    components(
        schemas(
            auth::models::Role,
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::UserResponse,
            categories::Category,
            categories::CategoryRequest,
            categories::CategoryEnvelope,
            categories::CategoriesEnvelope,
            categories::CategorySummary,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            products::ProductResponse,
            products::ProductEnvelope,
            products::ListedProduct,
            products::ProductPage,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration, login and sessions"),
        (name = "categories", description = "Category management (admin)"),
        (name = "products", description = "Product management and listing")
    ),
    info(
        title = "Shop Admin API",
        version = "1.0.0",
        description = "Session-authenticated API for managing shop categories and products"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub sessions: SessionManager,
    pub categories: Arc<dyn CategoryRepository>,
    pub products: ProductService,
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Liveness check
/// GET /api
#[utoipa::path(
    get,
    path = "/api",
    responses(
        (status = 200, description = "Service is up", body = String, example = json!("Ok."))
    ),
    tag = "health"
)]
pub async fn health() -> &'static str {
    "Ok."
}

/// Logs method and URI of every request. Bodies are never logged.
async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!("{} {}", request.method(), request.uri());
    next.run(request).await
}

/// Creates the application router with all routes under /api
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(health))
        .nest("/auth", auth::routes())
        .nest("/category", categories::routes(&state.sessions))
        .nest("/product", products::routes(&state.sessions));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .fallback(error::not_found)
        .layer(
            ServiceBuilder::new()
                // Mirrors the request origin and allows credentials for the session cookie
                .layer(CorsLayer::very_permissive())
                .layer(middleware::from_fn(log_request)),
        )
        .with_state(state)
}
