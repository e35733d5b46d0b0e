//! Caller-supplied time limits around rotator operations.

use std::future::Future;
use std::time::Duration;

use super::error::{SessionError, SessionErrorKind};

/// Run `operation`, abandoning it once `limit` has elapsed.
///
/// On timeout the in-flight future (and any store or notifier call inside
/// it) is dropped and a [`SessionErrorKind::Timeout`] error is returned. A
/// compare-and-update that had not completed is not committed.
///
/// The operation may fail with any error a [`SessionError`] converts into,
/// so a caller can bound a rotator call together with its own lookups.
pub async fn run_with_deadline<T, E, F>(limit: Duration, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<SessionError>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(elapsed) => {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "Session operation timed out");
            Err(SessionError::with_source(
                SessionErrorKind::Timeout,
                "session operation deadline exceeded",
                elapsed,
            )
            .into())
        }
    }
}
