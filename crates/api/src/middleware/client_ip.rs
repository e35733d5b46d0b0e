//! Client address extractor.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::AppError;

/// Address of the calling client.
///
/// Resolved from the first `X-Forwarded-For` entry, then `X-Real-IP`, then
/// the socket peer recorded by `into_make_service_with_connect_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = forwarded_ip(&parts.headers) {
            return Ok(ClientIp(ip));
        }

        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientIp(addr.ip().to_string()))
            .ok_or_else(|| AppError::BadRequest("Unable to determine client address".into()))
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let first_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    first_header("x-forwarded-for").or_else(|| first_header("x-real-ip"))
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<ClientIp, AppError> {
        let (mut parts, _) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn first_forwarded_entry_wins() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap().0, "203.0.113.7");
    }

    #[tokio::test]
    async fn falls_back_to_real_ip() {
        let request = Request::builder()
            .header("x-real-ip", "198.51.100.4")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap().0, "198.51.100.4");
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
        assert_eq!(extract(request).await.unwrap().0, "127.0.0.1");
    }

    #[tokio::test]
    async fn no_source_is_a_bad_request() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
