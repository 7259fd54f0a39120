//! Authorization gate.
//! Every route requires the configured key in the `Authorization` header.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// State required by the gate.
#[derive(Clone)]
pub struct AuthGate {
    key: Arc<str>,
}

impl AuthGate {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }

    fn accepts(&self, header: Option<&str>) -> bool {
        header == Some(&*self.key)
    }
}

pub async fn require_auth_key(
    State(gate): State<AuthGate>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if gate.accepts(auth_header) {
        tracing::info!(
            peer = %peer,
            method = %request.method(),
            uri = %request.uri(),
            "Request accepted"
        );
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        peer = %peer,
        method = %request.method(),
        uri = %request.uri(),
        "Unauthorized access"
    );
    Err(StatusCode::UNAUTHORIZED)
}
