//! Argon2id hashing and verification of refresh secrets.
//!
//! Refresh secrets are stored only as PHC strings with a random per-hash salt,
//! so a leaked `sessions` table does not let an attacker enumerate secrets.
//! Comparison goes through Argon2's verifier, never through string equality.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash a refresh secret using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a presented refresh secret against a stored PHC hash.
///
/// A digest that cannot be parsed never verifies.
pub fn verify_secret(digest: &str, candidate: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored refresh token hash is not a valid PHC string");
            return false;
        }
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let secret = "c2VjcmV0LXJlZnJlc2gtdG9rZW4";
        let hash = hash_secret(secret).expect("hashing should succeed");

        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );
        assert!(verify_secret(&hash, secret));
    }

    #[test]
    fn wrong_secret_fails() {
        let hash = hash_secret("generation-one").expect("hashing should succeed");
        assert!(!verify_secret(&hash, "generation-two"));
    }

    #[test]
    fn same_secret_hashes_differently() {
        let a = hash_secret("rand_string").expect("hashing should succeed");
        let b = hash_secret("rand_string").expect("hashing should succeed");
        assert_ne!(a, b, "salts must differ between hashes");
        assert!(verify_secret(&a, "rand_string"));
        assert!(verify_secret(&b, "rand_string"));
    }

    #[test]
    fn garbage_digest_never_verifies() {
        assert!(!verify_secret("not-a-phc-string", "anything"));
        assert!(!verify_secret("", ""));
    }
}
