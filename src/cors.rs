//! Cross-origin policy.
//!
//! Requests carrying an `Origin` outside the allow-list are turned away
//! before routing, preflights included. Requests without an `Origin`
//! header (same-origin, curl, server-to-server) always pass.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::error::AppError;

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:8080",
    "http://localhost:3000",
    "http://movies.com",
    "http://midu.dev",
];

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Arc<[HeaderValue]>,
}

impl OriginPolicy {
    /// Origins that cannot be represented as header values are skipped; no
    /// browser can send them anyway.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .filter_map(|origin| HeaderValue::from_str(origin.as_ref().trim()).ok())
            .collect::<Vec<_>>();

        Self {
            allowed: allowed.into(),
        }
    }

    pub fn permits(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allowed.iter().any(|allowed| allowed == origin),
        }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.allowed.iter().cloned()))
            .allow_headers(AllowHeaders::mirror_request())
            .allow_methods([
                Method::GET,
                Method::HEAD,
                Method::PUT,
                Method::PATCH,
                Method::POST,
                Method::DELETE,
            ])
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS)
    }
}

pub async fn reject_disallowed_origin(
    State(policy): State<OriginPolicy>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let origin = request.headers().get(header::ORIGIN).cloned();
    if policy.permits(origin.as_ref()) {
        return Ok(next.run(request).await);
    }

    let origin = origin
        .as_ref()
        .and_then(|origin| origin.to_str().ok())
        .unwrap_or("<non-ascii>")
        .to_string();
    warn!(origin = %origin, "rejected cross-origin request");
    Err(AppError::OriginRejected(origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_origin_is_always_permitted() {
        assert!(OriginPolicy::new(Vec::<String>::new()).permits(None));
        assert!(OriginPolicy::default().permits(None));
    }

    #[test]
    fn only_listed_origins_are_permitted() {
        let policy = OriginPolicy::default();

        assert!(policy.permits(Some(&HeaderValue::from_static("http://movies.com"))));
        assert!(policy.permits(Some(&HeaderValue::from_static("http://localhost:8080"))));
        assert!(!policy.permits(Some(&HeaderValue::from_static("https://movies.com"))));
        assert!(!policy.permits(Some(&HeaderValue::from_static("http://evil.test"))));
    }

    #[test]
    fn listed_origins_are_trimmed() {
        let policy = OriginPolicy::new([" http://a.test ", "http://b.test"]);
        assert!(policy.permits(Some(&HeaderValue::from_static("http://a.test"))));
    }
}
