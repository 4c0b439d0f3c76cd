use super::normalizer::plot_mode;
use super::*;
use crate::datasets::DatasetBase;
use crate::estimators::error::Result as EstimatorResult;
use crate::figure::LayoutOptions;
use crate::geometry::{LabelSet, PlotMode};
use base64::Engine;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordinary least squares that counts how often it is asked to fit.
#[derive(Default)]
struct CountingFit {
    calls: AtomicUsize,
}

impl Fit<f64, EstimatorError> for CountingFit {
    type Object = LinearRegression<f64>;

    fn fit(&self, dataset: &DatasetBase<f64>) -> EstimatorResult<LinearRegression<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        LinearRegression::params().fit(dataset)
    }
}

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

fn html(artifact: PlotArtifact) -> String {
    match artifact {
        PlotArtifact::Html(page) => page,
        PlotArtifact::ImageBase64(_) => panic!("expected html"),
    }
}

#[test]
fn normalize_reads_every_field() {
    let request = normalize(
        &body(json!({
            "X": [[1., 2.], [3., 4.]],
            "y": [1., 2.],
            "plot": "3d",
            "labels": {"title": "Prices", "z_label": "Price"},
            "layout": {"height": 600, "margin": {"l": 10}},
            "unused": true
        })),
        &PipelineConfig::default(),
    )
    .unwrap();

    assert_eq!(request.dataset.n_samples(), 2);
    assert_eq!(request.dataset.n_features(), 2);
    assert_eq!(request.mode, PlotMode::ThreeD);
    assert_eq!(request.labels.title.as_deref(), Some("Prices"));
    assert_eq!(request.labels.x_label, None);
    assert_eq!(request.layout.height, Some(600));
    assert_eq!(request.layout.margin.unwrap().l, Some(10));
}

#[test]
fn normalize_treats_null_as_absent() {
    let request = normalize(
        &body(json!({"X": [[1.]], "y": [1.], "plot": null, "labels": null, "layout": null})),
        &PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(request.mode, PlotMode::TwoD);
    assert_eq!(request.labels, LabelSet::default());
    assert_eq!(request.layout, LayoutOptions::default());
}

#[test]
fn normalize_rejects_malformed_bodies() {
    let config = PipelineConfig::default();
    for bad in [
        b"not json".to_vec(),
        body(json!({"y": [1.]})),
        body(json!({"X": [["a"]], "y": [1.]})),
        body(json!({"X": [[1.], [2., 3.]], "y": [1., 2.]})),
        body(json!({"X": [], "y": []})),
        body(json!({"X": [[]], "y": [1.]})),
        body(json!({"X": [[1.]], "y": [1., 2.]})),
        body(json!({"X": [[1.]], "y": [1.], "layout": {"height": -5}})),
        body(json!({"X": [[1.]], "y": [1.], "layout": {"width": 10.5}})),
    ] {
        match normalize(&bad, &config) {
            Err(PipelineError::InvalidInput(_)) => {}
            other => panic!("expected invalid input, got {:?}", other),
        }
    }
}

#[test]
fn plot_policy_controls_unknown_values() {
    assert_eq!(plot_mode(None, PlotPolicy::Strict).unwrap(), PlotMode::TwoD);
    assert_eq!(plot_mode(Some("2d"), PlotPolicy::Strict).unwrap(), PlotMode::TwoD);
    assert_eq!(plot_mode(Some("3d"), PlotPolicy::Strict).unwrap(), PlotMode::ThreeD);
    assert_eq!(plot_mode(Some("3D"), PlotPolicy::Permissive).unwrap(), PlotMode::TwoD);
    assert_eq!(plot_mode(Some("bar"), PlotPolicy::Permissive).unwrap(), PlotMode::TwoD);
    assert!(matches!(
        plot_mode(Some("bar"), PlotPolicy::Strict),
        Err(PipelineError::InvalidInput(_))
    ));
}

#[test]
fn three_d_with_wrong_column_count_never_fits() {
    let pipeline = Pipeline::with_params(PipelineConfig::default(), CountingFit::default());
    for x in [json!([[1.], [2.]]), json!([[1., 2., 3.], [4., 5., 6.]])] {
        let err = pipeline
            .run(&body(json!({"X": x, "y": [1., 2.], "plot": "3d"})))
            .unwrap_err();
        match err {
            PipelineError::InvalidInput(message) => {
                assert!(message.starts_with("3D plot requires exactly 2 features (columns) in X"))
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }
    assert_eq!(pipeline.params.calls.load(Ordering::SeqCst), 0);

    pipeline
        .run(&body(json!({"X": [[1., 1.], [2., 2.], [3., 3.]], "y": [1., 2., 3.], "plot": "3d"})))
        .unwrap();
    assert_eq!(pipeline.params.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn invalid_layout_is_rejected_before_fit() {
    let pipeline = Pipeline::with_params(PipelineConfig::default(), CountingFit::default());
    let err = pipeline
        .run(&body(json!({"X": [[1.]], "y": [1.], "layout": {"width": 0}})))
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert_eq!(pipeline.params.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_hyperparameters_surface_as_fit_errors() {
    let config = PipelineConfig::default();
    let pipeline = Pipeline::with_params(config, LinearRegression::params().rcond(-1.));
    let err = pipeline.run(&body(json!({"X": [[1.]], "y": [1.]}))).unwrap_err();
    assert_eq!(err, PipelineError::Fit(EstimatorError::InvalidTolerance(-1.)));
}

#[test]
fn single_feature_request_renders_line_chart() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let page = html(
        pipeline
            .run(&body(json!({"X": [[1.], [2.], [3.], [4.]], "y": [1., 2., 3., 4.]})))
            .unwrap(),
    );
    assert!(page.contains(r#""text":"2D Linear Regression""#));
    assert_eq!(page.matches(r#""type":"scatter""#).count(), 2);
    assert!(page.contains(r#""x":[1.0,2.0,3.0,4.0]"#));
    assert!(page.contains(r#""name":"Prediction""#));
}

#[test]
fn three_d_request_renders_surface() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let page = html(
        pipeline
            .run(&body(json!({
                "X": [[1., 1.], [2., 2.], [3., 3.]],
                "y": [1., 2., 3.],
                "plot": "3d",
                "labels": {"title": ""}
            })))
            .unwrap(),
    );
    assert_eq!(page.matches(r#""type":"scatter3d""#).count(), 1);
    assert_eq!(page.matches(r#""type":"surface""#).count(), 1);
    assert!(page.contains(r#""colorscale":"Reds""#));
    assert!(page.contains(r#""text":"3D Linear Regression""#));
    assert!(page.contains(r#""scene":"#));
}

#[test]
fn margin_policy_is_applied() {
    let request = body(json!({"X": [[1.], [2.]], "y": [1., 2.], "layout": {"margin": {"l": 50}}}));

    let floor = Pipeline::new(PipelineConfig::default());
    let page = html(floor.run(&request).unwrap());
    assert!(page.contains(r#""margin":{"l":120,"r":80,"b":120,"t":100,"pad":10}"#));

    let unrestricted = Pipeline::new(PipelineConfig {
        margin_policy: MarginPolicy::Unrestricted,
        ..PipelineConfig::default()
    });
    let page = html(unrestricted.run(&request).unwrap());
    assert!(page.contains(r#""margin":{"l":50,"r":80,"b":120,"t":100,"pad":10}"#));
}

#[test]
fn png_renderer_returns_image() {
    let pipeline = Pipeline::new(PipelineConfig {
        renderer: RendererKind::Png,
        ..PipelineConfig::default()
    });
    let artifact = pipeline
        .run(&body(json!({"X": [[1.], [2.], [3.]], "y": [2., 4., 6.], "layout": {"width": 200, "height": 150}})))
        .unwrap();
    let encoded = match artifact {
        PlotArtifact::ImageBase64(encoded) => encoded,
        PlotArtifact::Html(_) => panic!("expected an image"),
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn runs_are_idempotent() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let request = body(json!({"X": [[1., 5.], [2., 3.], [4., 4.], [0., 1.]], "y": [3., 2., 5., 1.]}));
    assert_eq!(pipeline.run(&request).unwrap(), pipeline.run(&request).unwrap());
}

#[test]
fn geometry_errors_map_to_pipeline_errors() {
    assert_eq!(
        PipelineError::from(GeometryError::Predict(EstimatorError::EmptyDataset)),
        PipelineError::Fit(EstimatorError::EmptyDataset)
    );
    assert!(matches!(
        PipelineError::from(GeometryError::ThreeDRequiresTwoFeatures(3)),
        PipelineError::InvalidInput(_)
    ));
}
