// HTTP handlers for authentication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{
    middleware::CurrentSession,
    models::{LoginRequest, RegisterRequest, UserResponse},
    session::Session,
};
use crate::error::ApiError;
use crate::validation::ValidatedJson;
use crate::AppState;

/// Register a new user and start a session
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, session cookie set", body = UserResponse),
        (status = 422, description = "Missing field or username taken", body = String, example = json!("ValidationError: Invalid data received."))
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let user = state.auth.register(request).await?;
    let jar = state.sessions.start(jar, Session::for_user(&user)).await?;

    Ok((jar, Json(UserResponse::from(user))))
}

/// Log in with username and password
/// POST /api/auth
#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = UserResponse),
        (status = 401, description = "Credentials did not match", body = String, example = json!("AuthenticationError: Username does not exist or password didn't match."))
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    // An unreadable body carries no credentials and fails like a wrong password
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!("Unreadable login body: {}", rejection);
        ApiError::Authentication
    })?;

    let user = state.auth.login(request).await?;
    let jar = state.sessions.start(jar, Session::for_user(&user)).await?;

    Ok((jar, Json(UserResponse::from(user))))
}

/// Check that the request carries a live session
/// GET /api/auth
#[utoipa::path(
    get,
    path = "/api/auth",
    responses(
        (status = 200, description = "Session is valid"),
        (status = 401, description = "No session", body = String, example = json!("NotAuthenticatedError: Not authenticated."))
    ),
    tag = "auth"
)]
pub async fn check_handler(CurrentSession(session): CurrentSession) -> Result<StatusCode, ApiError> {
    match session {
        Some(_) => Ok(StatusCode::OK),
        None => Err(ApiError::NotAuthenticated),
    }
}

/// Log out: destroy the session and clear the cookie. Always succeeds.
/// DELETE /api/auth
#[utoipa::path(
    delete,
    path = "/api/auth",
    responses(
        (status = 200, description = "Logged out")
    ),
    tag = "auth"
)]
pub async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> CookieJar {
    state.sessions.end(jar).await
}
