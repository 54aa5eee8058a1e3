// Cookie-carried sessions
//
// The cookie holds `token.signature`; the token keys a `{id, role}` record in
// the session store and the signature binds it to the configured secret.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::models::{Role, User};
use crate::auth::store::SessionStore;
use crate::config::{ConfigError, SessionConfig};
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Server-side session record: exactly the user id and role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: i32,
    pub role: Role,
}

impl Session {
    /// Session for a freshly registered or logged-in user.
    /// The role is captured now and not re-read while the session lives.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// Signs and verifies session tokens carried in cookies
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
            ConfigError::Invalid {
                name: "SESSION_SECRET",
                value: "<redacted>".to_string(),
            }
        })?;
        Ok(Self { mac })
    }

    /// Returns the cookie value `token.signature`
    pub fn sign(&self, token: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(token.as_bytes());
        format!("{}.{}", token, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the token if the signature matches, None otherwise
    pub fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (token, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(token.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(token)
    }
}

/// Creates, resolves and ends sessions for requests
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    signer: TokenSigner,
    cookie_name: String,
    cookie_secure: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            signer: TokenSigner::new(&config.secret)?,
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
        })
    }

    /// Persists a new session and adds its cookie to the jar
    pub async fn start(&self, jar: CookieJar, session: Session) -> Result<CookieJar, ApiError> {
        let token = Uuid::new_v4().simple().to_string();
        self.store.save(&token, &session).await?;

        tracing::debug!("Session started for user {}", session.user_id);
        Ok(jar.add(self.cookie(self.signer.sign(&token))))
    }

    /// Looks up the session referenced by the request cookie.
    /// Unsigned or tampered cookies resolve to no session without touching the store.
    pub async fn resolve(&self, jar: &CookieJar) -> Result<Option<Session>, ApiError> {
        let Some(token) = self.token(jar) else {
            return Ok(None);
        };

        Ok(self.store.load(&token).await?)
    }

    /// Destroys the session and removes the cookie.
    /// Store failures are logged and swallowed: the client is logged out either way.
    pub async fn end(&self, jar: CookieJar) -> CookieJar {
        if let Some(token) = self.token(&jar) {
            if let Err(e) = self.store.destroy(&token).await {
                tracing::error!("Failed to destroy session: {}", e);
            }
        }

        jar.remove(self.cookie(String::new()))
    }

    fn token(&self, jar: &CookieJar) -> Option<String> {
        let cookie = jar.get(&self.cookie_name)?;
        match self.signer.verify(cookie.value()) {
            Some(token) => Some(token.to_string()),
            None => {
                tracing::debug!("Ignoring session cookie with invalid signature");
                None
            }
        }
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{MemorySessionStore, SessionError};
    use crate::config::SessionBackend;
    use async_trait::async_trait;
    use std::time::Duration;

    fn session_config() -> SessionConfig {
        SessionConfig {
            backend: SessionBackend::Memory,
            redis_url: String::new(),
            secret: "cookie-secret".to_string(),
            ttl: Duration::from_secs(60),
            cookie_name: "sid".to_string(),
            cookie_secure: false,
        }
    }

    fn manager() -> SessionManager {
        let store = Arc::new(MemorySessionStore::new(Duration::from_secs(60)));
        SessionManager::new(store, &session_config()).unwrap()
    }

    fn jar_with(value: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new("sid", value.to_string()))
    }

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn save(&self, _token: &str, _session: &Session) -> Result<(), SessionError> {
            Err(SessionError::Corrupt(serde_json::from_str::<Session>("{").unwrap_err()))
        }

        async fn load(&self, _token: &str) -> Result<Option<Session>, SessionError> {
            Err(SessionError::Corrupt(serde_json::from_str::<Session>("{").unwrap_err()))
        }

        async fn destroy(&self, _token: &str) -> Result<(), SessionError> {
            Err(SessionError::Corrupt(serde_json::from_str::<Session>("{").unwrap_err()))
        }
    }

    #[test]
    fn test_session_serializes_as_id_and_role() {
        let session = Session {
            user_id: 4,
            role: Role::Client,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json, serde_json::json!({"id": 4, "role": "client"}));
    }

    #[test]
    fn test_signer_round_trip_and_tamper() {
        let signer = TokenSigner::new("k").unwrap();
        let value = signer.sign("abc123");

        assert_eq!(signer.verify(&value), Some("abc123"));
        assert_eq!(signer.verify("abc123"), None);
        assert_eq!(signer.verify(&value.replace("abc123", "abc124")), None);
        assert_eq!(TokenSigner::new("other").unwrap().verify(&value), None);
        assert_eq!(signer.verify("abc123.not-hex"), None);
    }

    #[tokio::test]
    async fn test_start_then_resolve() {
        let manager = manager();
        let session = Session {
            user_id: 9,
            role: Role::Admin,
        };

        let jar = manager.start(CookieJar::new(), session.clone()).await.unwrap();
        let cookie = jar.get("sid").unwrap();
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.path(), Some("/"));

        assert_eq!(manager.resolve(&jar).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_resolve_without_cookie_or_with_forged_cookie() {
        let manager = manager();

        assert_eq!(manager.resolve(&CookieJar::new()).await.unwrap(), None);
        assert_eq!(manager.resolve(&jar_with("forged.token")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_end_is_idempotent() {
        let manager = manager();
        let session = Session {
            user_id: 1,
            role: Role::Client,
        };
        let jar = manager.start(CookieJar::new(), session).await.unwrap();
        let value = jar.get("sid").unwrap().value().to_string();

        manager.end(jar_with(&value)).await;
        assert_eq!(manager.resolve(&jar_with(&value)).await.unwrap(), None);

        manager.end(jar_with(&value)).await;
        assert_eq!(manager.resolve(&jar_with(&value)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_end_swallows_store_failure() {
        let manager = SessionManager::new(Arc::new(BrokenStore), &session_config()).unwrap();
        let value = manager.signer.sign("tok");

        // completes without error even though destroy fails
        manager.end(jar_with(&value)).await;
    }

    #[tokio::test]
    async fn test_resolve_surfaces_store_failure() {
        let manager = SessionManager::new(Arc::new(BrokenStore), &session_config()).unwrap();
        let value = manager.signer.sign("tok");

        let err = manager.resolve(&jar_with(&value)).await.unwrap_err();
        assert_eq!(err.name(), "InternalServerError");
    }
}
