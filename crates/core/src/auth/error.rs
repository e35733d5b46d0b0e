//! Tagged error type returned by the session rotator.
//!
//! Every failure carries a [`SessionErrorKind`] so callers can branch on the
//! cause without inspecting messages, plus an optional underlying error.

use std::fmt;

use super::codec::TokenError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable classification of rotator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionErrorKind {
    /// The access token could not be signed.
    SigningFailed,
    /// The access token uses an algorithm other than HS512.
    AlgorithmMismatch,
    /// `exp` or `iat` is absent from the access token.
    MissingRequiredClaim,
    /// `user_id` or `ip` in the access token is unusable.
    InvalidClaims,
    /// The access token signature does not verify.
    BadSignature,
    /// The access token is not a decodable JWT.
    MalformedToken,
    /// The access or refresh token lifetime has passed.
    Expired,
    /// The presented pair does not belong to the stored generation.
    ValidationFailed,
    /// No session row exists for the token's user.
    SessionNotExists,
    /// A concurrent rotation won the optimistic-concurrency race.
    Conflict,
    /// Storage, lookup or secret-generation failure.
    Internal,
    /// The new-IP notice could not be delivered.
    NotificationFailed,
    /// The caller's deadline passed before the operation finished.
    Timeout,
}

impl SessionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SigningFailed => "signing_failed",
            Self::AlgorithmMismatch => "algorithm_mismatch",
            Self::MissingRequiredClaim => "missing_required_claim",
            Self::InvalidClaims => "invalid_claims",
            Self::BadSignature => "bad_signature",
            Self::MalformedToken => "malformed_token",
            Self::Expired => "expired",
            Self::ValidationFailed => "validation_failed",
            Self::SessionNotExists => "session_not_exists",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::NotificationFailed => "notification_failed",
            Self::Timeout => "timeout",
        }
    }

    /// Whether the failure means the presented credentials are unacceptable,
    /// as opposed to a server-side problem.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::AlgorithmMismatch
                | Self::MissingRequiredClaim
                | Self::InvalidClaims
                | Self::BadSignature
                | Self::MalformedToken
                | Self::Expired
                | Self::ValidationFailed
                | Self::SessionNotExists
        )
    }
}

impl fmt::Display for SessionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct SessionError {
    kind: SessionErrorKind,
    message: String,
    source: Option<BoxError>,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: SessionErrorKind,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::with_source(SessionErrorKind::Internal, message, source)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::ValidationFailed, message)
    }

    pub fn kind(&self) -> SessionErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        let (kind, message) = match &err {
            TokenError::Signing(_) => (
                SessionErrorKind::SigningFailed,
                "failed to create access token",
            ),
            TokenError::AlgorithmMismatch => (
                SessionErrorKind::AlgorithmMismatch,
                "failed to verify access token",
            ),
            TokenError::BadSignature => (
                SessionErrorKind::BadSignature,
                "failed to verify access token",
            ),
            TokenError::Malformed(_) => (
                SessionErrorKind::MalformedToken,
                "failed to verify access token",
            ),
            TokenError::MissingClaim(_) => (
                SessionErrorKind::MissingRequiredClaim,
                "failed to verify access token",
            ),
            TokenError::InvalidClaims(_) => (
                SessionErrorKind::InvalidClaims,
                "failed to verify access token",
            ),
            TokenError::Expired(_) => (SessionErrorKind::Expired, "access token"),
        };
        Self::with_source(kind, message, err)
    }
}
