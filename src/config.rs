// Runtime configuration
// Loaded once at startup and handed to the constructors that need it

use std::time::Duration;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Which session store backs the cookie tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

/// Cookie and lifetime settings for sessions
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub redis_url: String,
    pub secret: String,
    pub ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

/// Account created at startup when no user with that username exists
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Key for the password hasher. Changing it invalidates every stored hash.
    pub password_secret: String,
    pub session: SessionConfig,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// Reads the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let port = parse("PORT", or_default("PORT", "8080"))?;
        let ttl_secs: u64 = parse("SESSION_TTL_SECS", or_default("SESSION_TTL_SECS", "86400"))?;
        let cookie_secure = parse_bool("COOKIE_SECURE", or_default("COOKIE_SECURE", "false"))?;

        let backend = match or_default("SESSION_STORE", "redis").to_lowercase().as_str() {
            "redis" => SessionBackend::Redis,
            "memory" => SessionBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "SESSION_STORE",
                    value: other.to_string(),
                })
            }
        };

        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_TTL_SECS",
                value: "0".to_string(),
            });
        }

        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap {
                    name: or_default("ADMIN_NAME", "Administrator"),
                    username,
                    password,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port,
            password_secret: required("PASSWORD_SECRET")?,
            session: SessionConfig {
                backend,
                redis_url: or_default("REDIS_URL", "redis://127.0.0.1:6379"),
                secret: required("SESSION_SECRET")?,
                ttl: Duration::from_secs(ttl_secs),
                cookie_name: or_default("SESSION_COOKIE_NAME", "sid"),
                cookie_secure,
            },
            admin,
        })
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
