//! Bearer-token extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tokenpair_core::error::CoreError;

use crate::error::AppError;

/// Raw access token taken from `Authorization: Bearer <token>`.
///
/// Only the header shape is checked here. The token itself is validated by
/// the session rotator, which must be able to accept an expired one.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        Ok(BearerToken(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<BearerToken, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_token_after_prefix() {
        let BearerToken(token) = extract(Some("Bearer abc.def.ghi")).await.unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn other_schemes_are_rejected() {
        assert!(extract(Some("Basic dXNlcjpwYXNz")).await.is_err());
        assert!(extract(Some("Bearer ")).await.is_err());
    }
}
