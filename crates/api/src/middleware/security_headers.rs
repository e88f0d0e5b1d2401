//! Security headers middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Which optional headers to emit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityHeaders {
    /// Emit `Strict-Transport-Security`. Only behind TLS termination.
    pub hsts: bool,
}

/// Adds `nosniff`, `DENY` framing, a same-origin referrer policy and,
/// when enabled, HSTS to every response.
pub async fn security_headers_middleware(
    State(policy): State<SecurityHeaders>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("same-origin"),
    );

    if policy.hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}
