//! Security headers middleware
//!
//! Adds OWASP-recommended headers to every response. The API only serves
//! JSON, so the content security policy forbids loading anything.
//!
//! # Headers Applied
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: DENY`
//! - `Referrer-Policy: strict-origin-when-cross-origin`
//! - `Permissions-Policy`
//! - `Content-Security-Policy: default-src 'none'; frame-ancestors 'none'`
//! - `Strict-Transport-Security` (production only)
//!
//! # Example
//!
//! ```no_run
//! use axum::Router;
//! use linemark_api::middleware::security::SecurityHeadersLayer;
//!
//! let app: Router = Router::new().layer(SecurityHeadersLayer::new(true));
//! ```

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    response::Response,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

const STATIC_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        HeaderName::from_static("permissions-policy"),
        "geolocation=(), microphone=(), camera=(), payment=(), usb=()",
    ),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

/// Security headers middleware layer
#[derive(Clone)]
pub struct SecurityHeadersLayer {
    enable_hsts: bool,
}

impl SecurityHeadersLayer {
    /// `enable_hsts` should only be set when served over HTTPS
    pub fn new(enable_hsts: bool) -> Self {
        Self { enable_hsts }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            enable_hsts: self.enable_hsts,
        }
    }
}

#[derive(Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    enable_hsts: bool,
}

impl<S> Service<Request> for SecurityHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let enable_hsts = self.enable_hsts;

        Box::pin(async move {
            let mut response = future.await?;
            let headers = response.headers_mut();

            for (name, value) in STATIC_HEADERS {
                headers.insert(name, HeaderValue::from_static(value));
            }
            if enable_hsts {
                headers.insert(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static(HSTS),
                );
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn send(production: bool) -> Response {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(SecurityHeadersLayer::new(production))
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let response = send(false).await;
        let headers = response.headers();

        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            headers.get("Referrer-Policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert!(headers.get("Permissions-Policy").is_some());
        assert_eq!(
            headers.get("Content-Security-Policy").unwrap(),
            "default-src 'none'; frame-ancestors 'none'"
        );
        assert!(headers.get("Strict-Transport-Security").is_none());
    }

    #[tokio::test]
    async fn test_hsts_enabled_in_production() {
        let response = send(true).await;
        assert_eq!(
            response.headers().get("Strict-Transport-Security").unwrap(),
            HSTS
        );
    }

    #[tokio::test]
    async fn test_headers_on_not_found() {
        let response = Router::new()
            .layer(SecurityHeadersLayer::new(false))
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
        assert!(response.headers().get("X-Frame-Options").is_some());
    }
}
