// Session extraction and role-based authorization for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::auth::{
    models::Role,
    session::{Session, SessionManager},
};
use crate::error::ApiError;

/// Session resolved from the request cookie, if any
///
/// Resolved at most once per request: the result is cached in the request
/// extensions so the gate and the handler share a single store lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSession(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    SessionManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<CurrentSession>() {
            return Ok(cached.clone());
        }

        let sessions = SessionManager::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let current = CurrentSession(sessions.resolve(&jar).await?);

        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Authorization gate that requires a session carrying one of the allowed roles
#[derive(Debug, Clone)]
pub struct RequireRole {
    allowed: Vec<Role>,
}

impl RequireRole {
    /// Gate admitting only the listed roles
    pub fn only(roles: &[Role]) -> Self {
        Self {
            allowed: roles.to_vec(),
        }
    }

    /// Gate admitting any authenticated user
    pub fn any() -> Self {
        Self::only(&Role::ALL)
    }

    /// Gate admitting administrators only
    pub fn admin() -> Self {
        Self::only(&[Role::Admin])
    }

    /// Returns the session if it exists and its role is allowed
    pub fn check(&self, current: &CurrentSession) -> Result<Session, ApiError> {
        match &current.0 {
            Some(session) if self.allowed.contains(&session.role) => Ok(session.clone()),
            _ => Err(ApiError::Unauthorized),
        }
    }

    /// Middleware function that validates role-based access before the handler runs
    pub async fn middleware(
        self,
        current: CurrentSession,
        request: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let endpoint = request.uri().path().to_string();

        let session = self.check(&current).map_err(|e| {
            match &current.0 {
                Some(session) => warn!(
                    "Authorization failed: user_id={}, role={}, endpoint={}",
                    session.user_id, session.role, endpoint
                ),
                None => warn!("Missing session for protected endpoint: {}", endpoint),
            }
            e
        })?;

        debug!(
            "Authorization successful: user_id={}, role={}, endpoint={}",
            session.user_id, session.role, endpoint
        );
        Ok(next.run(request).await)
    }
}

/// Gate for admin-only route groups
pub async fn require_admin(
    current: CurrentSession,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    RequireRole::admin().middleware(current, request, next).await
}

/// Gate for route groups open to any authenticated user
pub async fn require_any(
    current: CurrentSession,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    RequireRole::any().middleware(current, request, next).await
}
