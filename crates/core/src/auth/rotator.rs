//! Issuance and rotation of access/refresh token pairs.
//!
//! Each user owns one session row describing the current *generation*: the
//! access token `jti`, the refresh secret hash, the client ip and the issue
//! time. Both [`SessionRotator::create_session`] and
//! [`SessionRotator::refresh_session`] write that row through one issuing
//! path; a refresh first validates the presented pair against the stored
//! generation and then replaces exactly that generation, bumping the version.
//!
//! Concurrent writers are resolved by the store's versioned compare-and-update.
//! The loser gets [`SessionErrorKind::Conflict`]; its tokens were never stored
//! and must be discarded. Nothing here retries.

use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::codec::{AccessClaims, TokenCodec, TokenError};
use super::error::{SessionError, SessionErrorKind};
use super::hashing::{hash_secret, verify_secret};
use super::secrets::{OsSecrets, SecretGenerator};
use super::store::{
    NewSession, Notifier, Session, SessionStore, SessionUpdate, StoreError, UserStore,
};
use crate::types::DbId;

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_LIFETIME_MINS: i64 = 30;
/// Default refresh token lifetime in days.
const DEFAULT_REFRESH_LIFETIME_DAYS: i64 = 30;

/// Token lifetimes applied by the rotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub access_token_lifetime: chrono::Duration,
    /// Measured from the session's `created_at`.
    pub refresh_token_lifetime: chrono::Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            access_token_lifetime: chrono::Duration::minutes(DEFAULT_ACCESS_LIFETIME_MINS),
            refresh_token_lifetime: chrono::Duration::days(DEFAULT_REFRESH_LIFETIME_DAYS),
        }
    }
}

/// A freshly issued access token and refresh secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionRotator {
    codec: TokenCodec,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    secrets: Arc<dyn SecretGenerator>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl SessionRotator {
    /// Build a rotator with OS randomness and the system clock.
    pub fn new(
        codec: TokenCodec,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            codec,
            sessions,
            users,
            notifier,
            secrets: Arc::new(OsSecrets),
            clock: Arc::new(SystemClock),
            policy,
        }
    }

    /// Replace the secret generator, e.g. with [`super::FixedSecrets`] in tests.
    pub fn with_secrets(mut self, secrets: Arc<dyn SecretGenerator>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a new generation for `user_id` bound to `ip`.
    ///
    /// The caller must already have established that `user_id` is a real
    /// identity; no existence check happens here. Creates the user's session
    /// row on first use and rotates it in place afterwards.
    pub async fn create_session(&self, user_id: DbId, ip: &str) -> Result<TokenPair, SessionError> {
        if user_id <= 0 {
            return Err(SessionError::new(
                SessionErrorKind::InvalidClaims,
                "user_id must be positive",
            ));
        }
        if ip.is_empty() {
            return Err(SessionError::new(
                SessionErrorKind::InvalidClaims,
                "ip is required",
            ));
        }

        let current = match self.sessions.get_by_user_id(user_id).await {
            Ok(session) => Some(session),
            Err(StoreError::NotFound) => None,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to load session");
                return Err(SessionError::internal("failed to load session", e));
            }
        };

        self.issue(user_id, ip, current).await
    }

    /// Sign a new pair and write it over `current`, the row the caller read.
    ///
    /// With no current row the session is inserted; otherwise the write is a
    /// compare-and-update on `current`'s version, so a row rotated since it
    /// was read yields [`SessionErrorKind::Conflict`].
    async fn issue(
        &self,
        user_id: DbId,
        ip: &str,
        current: Option<Session>,
    ) -> Result<TokenPair, SessionError> {
        let iat = self.clock.now().timestamp();
        let jti = self.secrets.new_token_id();

        let access_token = self.codec.encode(&AccessClaims {
            user_id,
            ip: ip.to_string(),
            jti: jti.clone(),
            iat,
            exp: iat + self.policy.access_token_lifetime.num_seconds(),
        })?;

        let refresh_token = self
            .secrets
            .new_refresh_secret()
            .map_err(|e| SessionError::internal("failed to create refresh token", e))?;

        let refresh_token_hash = hash_secret(&refresh_token).map_err(|e| {
            SessionError::new(
                SessionErrorKind::Internal,
                format!("failed to hash refresh token: {e}"),
            )
        })?;
        tracing::debug!(user_id, "Tokens created");

        match current {
            None => {
                let session = self
                    .sessions
                    .create(&NewSession {
                        user_id,
                        access_token_id: jti,
                        refresh_token_hash,
                        ip: ip.to_string(),
                        created_at: iat,
                    })
                    .await
                    .map_err(|e| match e {
                        StoreError::Duplicate(_) => {
                            tracing::warn!(user_id, "Concurrent first session creation");
                            SessionError::with_source(
                                SessionErrorKind::Conflict,
                                "session was created concurrently",
                                e,
                            )
                        }
                        other => {
                            tracing::error!(user_id, error = %other, "Failed to create session");
                            SessionError::internal("failed to create session", other)
                        }
                    })?;
                tracing::debug!(user_id, session_id = session.id, "Session created");
            }
            Some(current) => {
                let session = self
                    .sessions
                    .compare_and_update(
                        current.id,
                        current.version,
                        &SessionUpdate {
                            access_token_id: jti,
                            refresh_token_hash,
                            ip: ip.to_string(),
                            created_at: iat,
                        },
                    )
                    .await
                    .map_err(|e| match e {
                        StoreError::NotFound => {
                            tracing::warn!(
                                user_id,
                                session_id = current.id,
                                expected_version = current.version,
                                "Session was rotated concurrently"
                            );
                            SessionError::new(
                                SessionErrorKind::Conflict,
                                "session was modified concurrently",
                            )
                        }
                        other => {
                            tracing::error!(user_id, error = %other, "Failed to update session");
                            SessionError::internal("failed to update session", other)
                        }
                    })?;
                tracing::debug!(
                    user_id,
                    session_id = session.id,
                    version = session.version,
                    "Session rotated"
                );
            }
        }

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a presented access/refresh pair for a new generation.
    ///
    /// The access token may be expired; every other decoding failure is
    /// fatal. The pair must match the stored generation on refresh hash,
    /// `jti` and issue time, and the refresh lifetime must not have passed.
    /// When `observed_ip` differs from the ip in the token, the user is
    /// notified before the rotation and a failed delivery aborts it.
    pub async fn refresh_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        observed_ip: &str,
    ) -> Result<TokenPair, SessionError> {
        let now = self.clock.now().timestamp();

        let claims = match self.codec.decode_at(access_token, now) {
            Ok(claims) => claims,
            Err(TokenError::Expired(claims)) => {
                tracing::debug!(user_id = claims.user_id, "Refreshing with expired access token");
                *claims
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to verify access token");
                return Err(e.into());
            }
        };
        tracing::debug!(user_id = claims.user_id, "Access token verified");

        let session = match self.sessions.get_by_user_id(claims.user_id).await {
            Ok(session) => session,
            Err(StoreError::NotFound) => {
                tracing::warn!(user_id = claims.user_id, "Refresh for missing session");
                return Err(SessionError::new(
                    SessionErrorKind::SessionNotExists,
                    format!("session for user {} does not exist", claims.user_id),
                ));
            }
            Err(e) => {
                tracing::error!(user_id = claims.user_id, error = %e, "Failed to load session");
                return Err(SessionError::internal("failed to load session", e));
            }
        };

        if !verify_secret(&session.refresh_token_hash, refresh_token) {
            tracing::warn!(user_id = claims.user_id, "Refresh token does not match session");
            return Err(SessionError::validation(
                "refresh token does not match the current generation",
            ));
        }
        if claims.jti != session.access_token_id {
            tracing::warn!(user_id = claims.user_id, "Access token jti does not match session");
            return Err(SessionError::validation(
                "access token is not from the current generation",
            ));
        }

        if claims.iat != session.created_at {
            tracing::warn!(
                user_id = claims.user_id,
                token_iat = claims.iat,
                session_created_at = session.created_at,
                "Access token issue time does not match session"
            );
            return Err(SessionError::validation(
                "access and refresh token were issued at different times",
            ));
        }
        let refresh_expires_at =
            session.created_at + self.policy.refresh_token_lifetime.num_seconds();
        if refresh_expires_at < now {
            tracing::info!(user_id = claims.user_id, "Refresh token expired");
            return Err(SessionError::new(
                SessionErrorKind::Expired,
                "refresh token has expired",
            ));
        }

        if !same_address(&claims.ip, observed_ip) {
            self.notify_new_ip(&claims, observed_ip).await?;
        }

        // Write over the row validated above, not a fresh read, so a pair
        // refreshed twice concurrently rotates at most once.
        self.issue(claims.user_id, &claims.ip, Some(session)).await
    }

    async fn notify_new_ip(&self, claims: &AccessClaims, observed_ip: &str) -> Result<(), SessionError> {
        tracing::warn!(
            user_id = claims.user_id,
            old_ip = %claims.ip,
            new_ip = %observed_ip,
            "Login from new IP address"
        );

        let user = self.users.get_by_id(claims.user_id).await.map_err(|e| {
            tracing::error!(user_id = claims.user_id, error = %e, "Failed to resolve user");
            SessionError::internal("failed to resolve notification recipient", e)
        })?;

        self.notifier
            .send_login_from_new_ip(&claims.ip, &user.email)
            .await
            .map_err(|e| {
                tracing::error!(user_id = claims.user_id, error = %e, "Failed to send new IP notice");
                SessionError::with_source(
                    SessionErrorKind::NotificationFailed,
                    "failed to send login from new IP notice",
                    e,
                )
            })
    }
}

/// Compare two client addresses as IPs when both parse (so `::1` equals
/// `0:0:0:0:0:0:0:1` and `::ffff:10.0.0.1` equals `10.0.0.1`), otherwise as
/// plain strings.
fn same_address(a: &str, b: &str) -> bool {
    match (a.parse::<IpAddr>(), b.parse::<IpAddr>()) {
        (Ok(a), Ok(b)) => a.to_canonical() == b.to_canonical(),
        _ => a == b,
    }
}
