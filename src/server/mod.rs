//! HTTP front end exposing the pipeline on a single `POST` route.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use tokio::net::TcpListener;

use crate::estimators::error::EstimatorError;
use crate::estimators::traits::Fit;
use crate::pipeline::{self, Pipeline};
use crate::render::PlotArtifact;

#[cfg(test)]
mod tests;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ROUTE: &str = "/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Network settings of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the regression endpoint is mounted on.
    pub route: String,
    /// Upper bound on a single pipeline run.
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            route: DEFAULT_ROUTE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Work behind the endpoint: turns a raw request body into an artifact.
///
/// Called on the blocking pool, so implementations may take as long as
/// they need.
pub trait Runner: Send + Sync + 'static {
    fn run(&self, body: &[u8]) -> pipeline::Result<PlotArtifact>;
}

impl<P> Runner for Pipeline<P>
where
    P: Fit<f64, EstimatorError> + Send + Sync + 'static,
{
    fn run(&self, body: &[u8]) -> pipeline::Result<PlotArtifact> {
        Pipeline::run(self, body)
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<dyn Runner>,
    pub request_timeout: Duration,
}

/// Router with the regression endpoint mounted on `config.route`.
pub fn router(runner: Arc<dyn Runner>, config: &ServerConfig) -> Router {
    Router::new()
        .route(&config.route, post(regression))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(AppState {
            runner,
            request_timeout: config.request_timeout,
        })
}

/// Runs the request on the blocking pool, bounded by the request timeout.
///
/// Every pipeline error is answered with 400, a timeout with 503 and a
/// panicked pipeline run with 500. The body is always `{"error": ...}` on
/// failure.
pub async fn regression(State(state): State<AppState>, body: Bytes) -> Response {
    let runner = Arc::clone(&state.runner);
    let task = tokio::task::spawn_blocking(move || runner.run(&body));

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(Ok(artifact))) => (StatusCode::OK, Json(artifact)).into_response(),
        Ok(Ok(Err(e))) => {
            warn!("rejected request: {}", e);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e)) => {
            error!("pipeline task failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error while processing the request".to_string(),
            )
        }
        Err(_) => {
            let secs = state.request_timeout.as_secs_f64();
            warn!("request timed out after {}s", secs);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("request timed out after {}s", secs),
            )
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Binds `config.bind_addr()` and serves until Ctrl+C.
pub async fn serve(runner: Arc<dyn Runner>, config: &ServerConfig) -> std::io::Result<()> {
    let app = router(runner, config);
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        "listening on http://{} (POST {})",
        listener.local_addr()?,
        config.route
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => error!("failed to install Ctrl+C handler: {}", e),
    }
}
