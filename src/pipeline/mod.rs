//! Request-to-visualization pipeline.
//!
//! One [`Pipeline::run`] call takes a raw JSON body through input
//! normalization, the least squares fit, plot geometry, layout merging and
//! rendering. Nothing is shared between calls besides the configuration, so a
//! single pipeline serves concurrent requests.

use log::{debug, info, log_enabled, Level};
use thiserror::Error;

use crate::datasets::DatasetError;
use crate::estimators::error::EstimatorError;
use crate::estimators::hyperparams::LinearRegressionParams;
use crate::estimators::linear_regression::{r2_score, LinearRegression};
use crate::estimators::traits::{Fit, Predict};
use crate::figure::layout::LayoutError;
use crate::figure::{Figure, Layout, MarginPolicy};
use crate::geometry::{self, GeometryError};
use crate::render::{PlotArtifact, RenderError, Renderer, RendererKind};

#[cfg(test)]
mod tests;

pub mod normalizer;

pub use self::normalizer::{normalize, NormalizedRequest, RegressionRequest};

/// Simplified `Result` using [`PipelineError`] as error type
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Every way a request can fail. All of them are reported to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("model fit failed: {0}")]
    Fit(#[from] EstimatorError),
    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl From<DatasetError> for PipelineError {
    fn from(e: DatasetError) -> Self {
        PipelineError::InvalidInput(e.to_string())
    }
}

impl From<LayoutError> for PipelineError {
    fn from(e: LayoutError) -> Self {
        PipelineError::InvalidInput(e.to_string())
    }
}

impl From<GeometryError> for PipelineError {
    fn from(e: GeometryError) -> Self {
        match e {
            GeometryError::Predict(e) => PipelineError::Fit(e),
            other => PipelineError::InvalidInput(other.to_string()),
        }
    }
}

/// How the `plot` field of a request is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlotPolicy {
    /// `"3d"` selects the 3D chart, anything else the 2D chart
    #[default]
    Permissive,
    /// Only `"2d"` and `"3d"` are accepted
    Strict,
}

/// Behavioral options of the pipeline, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub renderer: RendererKind,
    pub margin_policy: MarginPolicy,
    pub plot_policy: PlotPolicy,
}

/// Fits and renders one regression chart per request.
///
/// `P` is the unchecked hyperparameter set used for every fit.
pub struct Pipeline<P = LinearRegressionParams<f64>> {
    config: PipelineConfig,
    params: P,
    renderer: Box<dyn Renderer>,
}

impl Pipeline {
    /// Pipeline fitting ordinary least squares with an intercept.
    pub fn new(config: PipelineConfig) -> Pipeline {
        Pipeline::with_params(config, LinearRegression::params())
    }
}

impl<P> Pipeline<P>
where
    P: Fit<f64, EstimatorError>,
{
    pub fn with_params(config: PipelineConfig, params: P) -> Pipeline<P> {
        Pipeline {
            config,
            params,
            renderer: config.renderer.build(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage on a raw request body.
    ///
    /// Requests that cannot produce a valid chart, a 3D chart over a column
    /// count other than two or an out of range layout size, are rejected
    /// before the fit.
    pub fn run(&self, body: &[u8]) -> Result<PlotArtifact> {
        let NormalizedRequest {
            dataset,
            mode,
            labels,
            layout,
        } = normalize(body, &self.config)?;
        debug!(
            "normalized request: {} samples, {} features, {:?}",
            dataset.n_samples(),
            dataset.n_features(),
            mode
        );

        geometry::check_mode(&dataset, mode)?;
        let frame = layout.resolve(self.config.margin_policy)?;

        let model = self.params.fit(&dataset)?;
        if log_enabled!(Level::Info) {
            let y_pred = model.predict(dataset.design_matrix())?;
            let r2 = r2_score(dataset.targets(), y_pred.view())?;
            info!(
                "fitted linear model on {} samples, R^2 = {:.4}",
                dataset.n_samples(),
                r2
            );
        }

        let chart = geometry::build(&model, &dataset, mode, &labels)?;
        let figure = Figure {
            traces: chart.traces,
            layout: Layout::assemble(chart.skeleton, frame),
        };

        let artifact = self.renderer.render(&figure)?;
        info!("generated {} length: {}", artifact.kind(), artifact.len());
        Ok(artifact)
    }
}
