//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, authorization)
//! - Keep forced refreshes out of the request timeout
//! - Mount the development asset server when enabled
//! - Serve until shutdown is signalled

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::assets;
use crate::http::handlers::{get_config, refresh_config};
use crate::http::middleware::{require_auth_key, AuthGate};
use crate::http::request::{request_span, UuidRequestId};
use crate::remote_config::ConfigStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
}

/// HTTP front end of the configuration store.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server answering from `store`.
    pub fn new(config: &ServerConfig, store: Arc<ConfigStore>) -> Self {
        let state = AppState { store };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `/config/refresh` is not under the request timeout; the refresh's own
    /// fetch timeouts and retry limit bound it.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let mut bounded = Router::new().route("/config/{version}", get(get_config));

        if config.file_server.enabled {
            bounded = bounded.nest_service("/assets", assets::router(&config.file_server.assets_dir));
        }

        let bounded = bounded.layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )));

        let gate = AuthGate::new(config.auth.key.as_str());

        Router::new()
            .route("/config/refresh", get(refresh_config))
            .merge(bounded)
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, require_auth_key))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
