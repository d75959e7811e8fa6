//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the lookup handler
//! - Wire up middleware (tracing, timeout)
//! - Serve until shutdown, swapping endpoints on route file updates
//!
//! # Design Decisions
//! - Endpoints live behind `ArcSwap`: lookups never block on a reload
//! - A route file that fails to prepare leaves the current endpoints in place

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    extract::State,
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::routes::{build_endpoints, Endpoints};
use crate::config::schema::{RoutesConfig, ServerConfig};
use crate::http::response::{status_code, MatchBody, RouteBody};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::router::{Dispatch, Status};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub endpoints: Arc<ArcSwap<Endpoints>>,
}

impl AppState {
    pub fn new(endpoints: Endpoints) -> Self {
        metrics::record_endpoints(endpoints.len());
        Self {
            endpoints: Arc::new(ArcSwap::from_pointee(endpoints)),
        }
    }

    /// Build endpoints from `config` and swap them in.
    ///
    /// Returns false, keeping the current endpoints, when preparation fails.
    pub fn apply(&self, config: &RoutesConfig) -> bool {
        match build_endpoints(config) {
            Ok(endpoints) => {
                metrics::record_endpoints(endpoints.len());
                self.endpoints.store(Arc::new(endpoints));
                tracing::info!("Endpoints reloaded");
                true
            }
            Err(errors) => {
                for e in &errors {
                    tracing::error!(error = %e, "Reload rejected");
                }
                false
            }
        }
    }
}

/// HTTP server for the router.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, endpoints: Endpoints) -> Self {
        let state = AppState::new(endpoints);
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(route_handler))
            .route("/", any(route_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Route files arriving on `updates` replace the endpoints when they
    /// prepare cleanly.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: Option<mpsc::UnboundedReceiver<RoutesConfig>>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(mut updates) = updates {
            let state = self.state.clone();
            tokio::spawn(async move {
                while let Some(config) = updates.recv().await {
                    state.apply(&config);
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the endpoint, dispatch on the method and report the outcome.
async fn route_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let start = Instant::now();
    let path = uri.path();
    let (status, body) = lookup(&state.endpoints.load(), method.as_str(), path);

    tracing::debug!(method = %method, path = %path, status = status.as_str(), "Lookup");
    metrics::record_lookup(method.as_str(), status, start);

    (status_code(status), Json(body)).into_response()
}

/// Answer one request against `endpoints`.
pub fn lookup(endpoints: &Endpoints, method: &str, path: &str) -> (Status, RouteBody) {
    let Some((_, set, segments)) = endpoints.resolve(path) else {
        return (Status::NotFound, RouteBody::error("no endpoint"));
    };

    let dispatch = set.find(method, &segments);
    let status = dispatch.status();
    let body = match dispatch {
        Dispatch::Describe(description) => RouteBody::Describe(description),
        Dispatch::MethodNotAllowed => RouteBody::error(format!("method {method} not allowed")),
        Dispatch::Lookup(Ok(Some(found))) => RouteBody::Match(MatchBody::from(found)),
        Dispatch::Lookup(Ok(None)) => RouteBody::error("no chain matched"),
        Dispatch::Lookup(Err(e)) => RouteBody::error(e.to_string()),
    };
    (status, body)
}
