//! Token identifiers and refresh secrets.
//!
//! [`OsSecrets`] is the production generator. [`FixedSecrets`] always returns
//! the same strings and exists for deterministic tests; it is selected when
//! the rotator is built, never switched on at runtime.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use uuid::Uuid;

/// Random bytes behind every refresh secret (416 bits).
pub const REFRESH_SECRET_BYTES: usize = 52;

/// The operating system could not supply random bytes.
#[derive(Debug, thiserror::Error)]
#[error("entropy source unavailable: {0}")]
pub struct SecretError(String);

/// Produces `jti` values and opaque refresh secrets.
pub trait SecretGenerator: Send + Sync {
    /// A globally unique access-token identifier.
    fn new_token_id(&self) -> String;

    /// A URL-safe, high-entropy refresh secret.
    fn new_refresh_secret(&self) -> Result<String, SecretError>;
}

/// UUID v4 identifiers and OS-random refresh secrets.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSecrets;

impl SecretGenerator for OsSecrets {
    fn new_token_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn new_refresh_secret(&self) -> Result<String, SecretError> {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SecretError(e.to_string()))?;
        Ok(URL_SAFE.encode(bytes))
    }
}

/// Returns the same identifier and secret on every call.
#[derive(Debug, Clone)]
pub struct FixedSecrets {
    token_id: String,
    refresh_secret: String,
}

impl FixedSecrets {
    pub fn new(token_id: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            refresh_secret: refresh_secret.into(),
        }
    }
}

impl SecretGenerator for FixedSecrets {
    fn new_token_id(&self) -> String {
        self.token_id.clone()
    }

    fn new_refresh_secret(&self) -> Result<String, SecretError> {
        Ok(self.refresh_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_secret_is_url_safe_base64_of_52_bytes() {
        let secret = OsSecrets.new_refresh_secret().expect("os rng should work");
        assert_eq!(secret.len(), 72);

        let decoded = URL_SAFE.decode(&secret).expect("must decode as url-safe base64");
        assert_eq!(decoded.len(), REFRESH_SECRET_BYTES);
        assert!(!secret.contains('+') && !secret.contains('/'));
    }

    #[test]
    fn os_secrets_do_not_repeat() {
        let a = OsSecrets.new_refresh_secret().unwrap();
        let b = OsSecrets.new_refresh_secret().unwrap();
        assert_ne!(a, b);
        assert_ne!(OsSecrets.new_token_id(), OsSecrets.new_token_id());
    }

    #[test]
    fn token_id_is_a_uuid() {
        let id = OsSecrets.new_token_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn fixed_secrets_are_stable() {
        let fixed = FixedSecrets::new("uuid_string", "rand_string");
        assert_eq!(fixed.new_token_id(), "uuid_string");
        assert_eq!(fixed.new_refresh_secret().unwrap(), "rand_string");
        assert_eq!(fixed.new_refresh_secret().unwrap(), "rand_string");
    }
}
