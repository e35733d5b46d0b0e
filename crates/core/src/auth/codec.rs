//! Access-token encoding and validation.
//!
//! Access tokens are HS512-signed JWTs carrying [`AccessClaims`]. HS512 is the
//! only accepted algorithm. Decoding verifies the signature first, then the
//! required and structural claims, and only then expiry, so an expired token
//! is reported as [`TokenError::Expired`] with its claims while a structurally
//! broken one is rejected outright.

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::{DbId, UnixSeconds};

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// The session owner's user id.
    pub user_id: DbId,
    /// Client address the token was issued to.
    pub ip: String,
    /// Token identifier binding the token to one session generation.
    pub jti: String,
    /// Issued-at (UTC unix seconds).
    pub iat: UnixSeconds,
    /// Expiration (UTC unix seconds).
    pub exp: UnixSeconds,
}

/// Claims as they appear on the wire, before required-claim checks.
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    user_id: DbId,
    #[serde(default)]
    ip: String,
    #[serde(default)]
    jti: String,
    iat: Option<UnixSeconds>,
    exp: Option<UnixSeconds>,
}

/// Just the `alg` of a JOSE header, read before jsonwebtoken parses it so
/// that names it does not know (`none`) still count as a mismatch.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign access token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("unexpected signing algorithm")]
    AlgorithmMismatch,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token is malformed: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("token is missing required claim `{0}`")]
    MissingClaim(&'static str),

    #[error("token has invalid claims: {0}")]
    InvalidClaims(&'static str),

    /// Signature and claims are valid but `exp` has passed.
    #[error("token has expired")]
    Expired(Box<AccessClaims>),
}

/// Signs and verifies access tokens with a shared HS512 secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// The single allow-listed signing algorithm.
    pub const ALGORITHM: Algorithm = Algorithm::HS512;
    const ALGORITHM_NAME: &'static str = "HS512";

    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry and required claims are checked in `decode_at`, after the
        // structural checks.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode(&Header::new(Self::ALGORITHM), claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Decode against the current wall-clock time.
    pub fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Decode and validate `token`, treating `now` as the current instant.
    pub fn decode_at(&self, token: &str, now: UnixSeconds) -> Result<AccessClaims, TokenError> {
        if declared_algorithm(token).is_some_and(|alg| alg != Self::ALGORITHM_NAME) {
            return Err(TokenError::AlgorithmMismatch);
        }

        let wire = decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(classify)?
            .claims;

        let exp = wire.exp.ok_or(TokenError::MissingClaim("exp"))?;
        let iat = wire.iat.ok_or(TokenError::MissingClaim("iat"))?;

        if wire.user_id <= 0 {
            return Err(TokenError::InvalidClaims("user_id is required"));
        }
        if wire.ip.is_empty() {
            return Err(TokenError::InvalidClaims("ip is required"));
        }

        let claims = AccessClaims {
            user_id: wire.user_id,
            ip: wire.ip,
            jti: wire.jti,
            iat,
            exp,
        };

        if exp < now {
            return Err(TokenError::Expired(Box::new(claims)));
        }
        Ok(claims)
    }
}

/// The `alg` named in the token header, if the header segment is readable.
fn declared_algorithm(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes)
        .ok()
        .map(|header| header.alg)
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::AlgorithmMismatch
        }
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed(err),
    }
}
