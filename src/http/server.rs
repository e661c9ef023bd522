//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (request id, tracing, timeout)
//! - Spawn one health probe per service pool
//! - Resolve pool, select replica, forward, relay

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, Scheme},
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::balance::pool::PoolError;
use crate::config::BalancerConfig;
use crate::health::{HealthProbe, ProbeError};
use crate::http::request::MakeRequestUuid;
use crate::observability::metrics;
use crate::routing::Registry;

/// Error building the server. Startup-fatal.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
    client: Client<HttpConnector, Body>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    probes: Vec<HealthProbe>,
}

impl HttpServer {
    /// Build the registry, probes, and router from configuration.
    pub fn new(config: BalancerConfig) -> Result<Self, ServerError> {
        let registry = Arc::new(Registry::from_config(&config.services)?);

        let mut probes = Vec::new();
        if config.health_check.enabled {
            for pool in registry.pools() {
                probes.push(HealthProbe::new(
                    pool.name(),
                    pool.replicas().to_vec(),
                    &config.health_check,
                )?);
            }
        }

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState { registry, client };
        let router = Self::build_router(&config, state);

        Ok(Self { router, probes })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let HttpServer { router, probes } = self;

        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        for probe in probes {
            tokio::spawn(probe.run(shutdown.resubscribe()));
        }

        let mut shutdown = shutdown;
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: resolve the pool, ask its strategy for a replica,
/// forward the request unmodified, and relay the response verbatim.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    let Some(pool) = state.registry.resolve(&path) else {
        tracing::warn!(path = %path, "no service matches request path");
        metrics::record_request(&method, StatusCode::NOT_FOUND.as_u16(), "none", start);
        return (StatusCode::NOT_FOUND, "no service matches the request path").into_response();
    };

    let replica = match pool.select() {
        Ok(replica) => replica,
        Err(e) => {
            tracing::error!(service = %pool.name(), error = %e, "replica selection failed");
            metrics::record_request(
                &method,
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "none",
                start,
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "no available replicas").into_response();
        }
    };

    tracing::debug!(service = %pool.name(), replica = %replica.addr, path = %path, "forwarding request");

    // Retarget the URI at the chosen replica; method, headers and body
    // pass through untouched.
    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Authority::from_str(&replica.addr.to_string()).ok();
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(replica = %replica.addr, error = %e, "failed to build upstream uri");
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), "none", start);
            return (StatusCode::BAD_GATEWAY, "failed to address upstream").into_response();
        }
    };

    let replica_label = replica.addr.to_string();
    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), &replica_label, start);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(replica = %replica_label, error = %e, "upstream request failed");
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), &replica_label, start);
            (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
        }
    }
}
