use serde::Deserialize;

use super::{PipelineConfig, PipelineError, PlotPolicy, Result};
use crate::datasets::Dataset;
use crate::figure::LayoutOptions;
use crate::geometry::{LabelSet, PlotMode};

/// Wire format of a request body. Unknown keys are ignored and `null`
/// optional fields read as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionRequest {
    #[serde(rename = "X")]
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub labels: Option<LabelSet>,
    #[serde(default)]
    pub layout: Option<LayoutOptions>,
}

/// A validated request, ready for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub dataset: Dataset,
    pub mode: PlotMode,
    pub labels: LabelSet,
    pub layout: LayoutOptions,
}

/// Parses and validates a raw request body.
pub fn normalize(body: &[u8], config: &PipelineConfig) -> Result<NormalizedRequest> {
    let request: RegressionRequest = serde_json::from_slice(body)
        .map_err(|e| PipelineError::InvalidInput(format!("invalid request body: {}", e)))?;

    let mode = plot_mode(request.plot.as_deref(), config.plot_policy)?;
    let dataset = Dataset::from_rows(&request.x, request.y)?;

    Ok(NormalizedRequest {
        dataset,
        mode,
        labels: request.labels.unwrap_or_default(),
        layout: request.layout.unwrap_or_default(),
    })
}

/// Maps the `plot` field onto a [`PlotMode`]. An absent field is 2D under
/// every policy.
pub fn plot_mode(plot: Option<&str>, policy: PlotPolicy) -> Result<PlotMode> {
    match (plot, policy) {
        (Some("3d"), _) => Ok(PlotMode::ThreeD),
        (None, _) | (Some("2d"), _) | (Some(_), PlotPolicy::Permissive) => Ok(PlotMode::TwoD),
        (Some(other), PlotPolicy::Strict) => Err(PipelineError::InvalidInput(format!(
            "unknown plot type {:?}, expected \"2d\" or \"3d\"",
            other
        ))),
    }
}
