// Keyed password hashing

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::models::User;
use crate::config::ConfigError;

type HmacSha256 = Hmac<Sha256>;

/// Deterministic keyed hash of plaintext passwords (HMAC-SHA256, hex)
///
/// There is no per-user salt: two users with the same password share a hash
/// under the same secret, and rotating the secret invalidates every stored hash.
#[derive(Clone)]
pub struct PasswordHasher {
    mac: HmacSha256,
}

impl PasswordHasher {
    /// Builds the keyed MAC once from the configured secret
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
            ConfigError::Invalid {
                name: "PASSWORD_SECRET",
                value: "<redacted>".to_string(),
            }
        })?;
        Ok(Self { mac })
    }

    /// Hash a plaintext password
    pub fn hash(&self, plaintext: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(plaintext.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// True iff hashing `plaintext` reproduces the user's stored hash
    pub fn verify(&self, user: &User, plaintext: &str) -> bool {
        self.hash(plaintext) == user.password_hash
    }
}
