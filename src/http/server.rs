//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared, read-only application state
//! - Create the Axum router and wire the middleware stack
//! - Serve connections until the shutdown signal fires

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::any, Router};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handler::gateway_handler;
use crate::identity::{HttpIdentityProvider, IdentityEnricher, IdentityError};
use crate::proxy::{build_client, ForwardingProxy};
use crate::routing::TargetResolver;

/// Application state injected into handlers.
///
/// Everything here is immutable after startup; clones share the same data.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub resolver: Arc<TargetResolver>,
    pub enricher: IdentityEnricher,
    pub proxy: ForwardingProxy,
}

impl AppState {
    /// Build the state from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, IdentityError> {
        let enricher = match config.identity.base_url() {
            Some(base) => {
                let timeout = Duration::from_secs(config.identity.timeout_secs);
                let provider = HttpIdentityProvider::new(&base, timeout)?;
                tracing::info!(identity_service = %base, "Identity enrichment enabled");
                IdentityEnricher::new(Arc::new(provider))
            }
            None => {
                tracing::warn!("No identity service configured, all callers are anonymous");
                IdentityEnricher::anonymous()
            }
        };
        Ok(Self::with_enricher(config, enricher))
    }

    /// Build the state with a caller-supplied enricher.
    pub fn with_enricher(config: GatewayConfig, enricher: IdentityEnricher) -> Self {
        let client = build_client(Duration::from_secs(config.timeouts.connect_secs));
        let proxy = ForwardingProxy::new(client, Duration::from_secs(config.timeouts.upstream_secs));
        Self {
            resolver: Arc::new(TargetResolver::from_config(&config)),
            config: Arc::new(config),
            enricher,
            proxy,
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, IdentityError> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Create a server around prepared state.
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.clone();
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = ?self.config.routes,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
