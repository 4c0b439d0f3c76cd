use std::sync::mpsc;
use std::sync::Mutex;

use super::*;
use crate::pipeline::{PipelineConfig, PipelineError};
use crate::render::RendererKind;
use serde_json::{json, Value};

fn state(config: PipelineConfig, request_timeout: Duration) -> AppState {
    AppState {
        runner: Arc::new(Pipeline::new(config)),
        request_timeout,
    }
}

/// Blocks every run until a message arrives on its channel.
struct Blocked(Mutex<mpsc::Receiver<()>>);

impl Runner for Blocked {
    fn run(&self, _body: &[u8]) -> pipeline::Result<PlotArtifact> {
        let _ = self.0.lock().unwrap().recv();
        Err(PipelineError::InvalidInput("released".to_string()))
    }
}

struct Panics;

impl Runner for Panics {
    fn run(&self, _body: &[u8]) -> pipeline::Result<PlotArtifact> {
        panic!("renderer exploded")
    }
}

async fn call(state: AppState, body: Value) -> (StatusCode, Value) {
    let body = Bytes::from(serde_json::to_vec(&body).unwrap());
    let response = regression(State(state), body).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn answers_with_html_document() {
    let state = state(PipelineConfig::default(), Duration::from_secs(30));
    let (status, body) = call(state, json!({"X": [[1.], [2.], [3.]], "y": [2., 4., 6.]})).await;

    assert_eq!(status, StatusCode::OK);
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("plotly-3.0.1.min.js"));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn answers_with_image_when_configured() {
    let config = PipelineConfig {
        renderer: RendererKind::Png,
        ..PipelineConfig::default()
    };
    let (status, body) = call(
        state(config, Duration::from_secs(30)),
        json!({"X": [[1.], [2.], [3.]], "y": [2., 4., 6.], "layout": {"width": 120, "height": 90}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["image_base64"].as_str().unwrap().starts_with("iVBOR"));
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let state = state(PipelineConfig::default(), Duration::from_secs(30));
    let (status, body) = call(
        state.clone(),
        json!({"X": [[1.], [2.]], "y": [1., 2.], "plot": "3d"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("3D plot requires exactly 2 features (columns) in X"));

    let (status, body) = call(state, json!({"X": [[1.]]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn slow_run_times_out() {
    let (release, blocked) = mpsc::channel();
    let state = AppState {
        runner: Arc::new(Blocked(Mutex::new(blocked))),
        request_timeout: Duration::from_millis(50),
    };
    let (status, body) = call(state, json!({"X": [[1.]], "y": [1.]})).await;
    release.send(()).unwrap();

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "request timed out after 0.05s");
}

#[tokio::test]
async fn panicked_run_is_internal_error() {
    let state = AppState {
        runner: Arc::new(Panics),
        request_timeout: Duration::from_secs(30),
    };
    let (status, body) = call(state, json!({"X": [[1.]], "y": [1.]})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal error while processing the request");
}

#[tokio::test]
async fn oversized_image_is_bad_request() {
    let config = PipelineConfig {
        renderer: RendererKind::Png,
        ..PipelineConfig::default()
    };
    let (status, body) = call(
        state(config, Duration::from_secs(30)),
        json!({"X": [[1.], [2.], [3.]], "y": [2., 4., 6.], "layout": {"width": 10000, "height": 10000}}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("raster limit"));
}

#[test]
fn default_server_config() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    assert_eq!(config.route, "/");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.max_body_bytes, 2_097_152);
}

#[test]
fn router_mounts_configured_route() {
    let config = ServerConfig {
        route: "/regression".to_string(),
        ..ServerConfig::default()
    };
    let _ = router(Arc::new(Pipeline::new(PipelineConfig::default())), &config);
}
