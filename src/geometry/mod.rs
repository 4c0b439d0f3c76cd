use log::debug;
use ndarray::{Array1, Array2};
use serde::Deserialize;
use thiserror::Error;

use crate::datasets::{Dataset, DatasetBase};
use crate::estimators::error::EstimatorError;
use crate::estimators::traits::Predict;
use crate::figure::layout::{Axes, Axis, LayoutSkeleton, Scene, Title};
use crate::figure::{
    Colorscale, Line, LineDash, Marker, Mode, NamedColor, Scatter, Scatter3d, Surface, Trace,
};
use crate::helpers::grid::{linspace, meshgrid, min_max};


/// Number of samples per feature axis of the prediction surface.
pub const GRID_POINTS: usize = 20;

const SURFACE_OPACITY: f64 = 0.7;
const SCATTER3D_MARKER_SIZE: f64 = 8.;
const SCATTER3D_MARKER_OPACITY: f64 = 0.8;
const SCATTER_MARKER_SIZE: f64 = 10.;
const PREDICTION_LINE_WIDTH: f64 = 3.;

/// Simplified `Result` using [`GeometryError`] as error type
pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("3D plot requires exactly 2 features (columns) in X, got {0}")]
    ThreeDRequiresTwoFeatures(usize),
    #[error(transparent)]
    Predict(#[from] EstimatorError),
    #[error("cannot derive a plotting range from non-finite {0}")]
    NonFiniteRange(&'static str),
}

/// Chart family requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    #[default]
    TwoD,
    ThreeD,
}

/// Optional chart title and axis titles. Missing or empty entries fall back
/// to defaults that depend on the chart being drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LabelSet {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub z_label: Option<String>,
}

impl LabelSet {
    fn pick(label: &Option<String>, default: &str) -> String {
        match label.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => default.to_string(),
        }
    }
}

/// Traces and the layout skeleton derived from a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub traces: Vec<Trace>,
    pub skeleton: LayoutSkeleton,
}

/// Rejects plot modes the dataset cannot support. Runs before fitting.
pub fn check_mode<F>(dataset: &DatasetBase<F>, mode: PlotMode) -> Result<()>
where
    F: crate::Float,
{
    if mode == PlotMode::ThreeD && dataset.n_features() != 2 {
        return Err(GeometryError::ThreeDRequiresTwoFeatures(dataset.n_features()));
    }
    Ok(())
}

/// Derives the traces and layout skeleton for `mode`:
///
/// * 3D, two features: the observations and the regression plane sampled on a
///   [`GRID_POINTS`]² grid spanning both feature ranges;
/// * 2D, one feature: the observations and the fitted line at the observed x;
/// * 2D, several features: actual against predicted targets with the identity
///   line as reference.
pub fn build<M>(model: &M, dataset: &Dataset, mode: PlotMode, labels: &LabelSet) -> Result<Chart>
where
    M: Predict<f64, EstimatorError>,
{
    check_mode(dataset, mode)?;
    let chart = match mode {
        PlotMode::ThreeD => regression_surface(model, dataset, labels)?,
        PlotMode::TwoD if dataset.n_features() == 1 => regression_line(model, dataset, labels)?,
        PlotMode::TwoD => actual_vs_predicted(model, dataset, labels)?,
    };
    debug!(
        "built {} traces ({})",
        chart.traces.len(),
        chart
            .traces
            .iter()
            .map(Trace::kind)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(chart)
}

fn regression_surface<M>(model: &M, dataset: &Dataset, labels: &LabelSet) -> Result<Chart>
where
    M: Predict<f64, EstimatorError>,
{
    let x0 = dataset.feature(0);
    let x1 = dataset.feature(1);
    let (min0, max0) = min_max(x0).ok_or(GeometryError::NonFiniteRange("feature 1"))?;
    let (min1, max1) = min_max(x1).ok_or(GeometryError::NonFiniteRange("feature 2"))?;

    let (xx, yy) = meshgrid(
        linspace(min0, max0, GRID_POINTS).view(),
        linspace(min1, max1, GRID_POINTS).view(),
    );
    let (rows, cols) = xx.dim();
    let grid = Array2::from_shape_fn((rows * cols, 2), |(k, c)| {
        let at = [k / cols, k % cols];
        if c == 0 {
            xx[at]
        } else {
            yy[at]
        }
    });
    let z: Array1<f64> = model.predict(grid.view())?;

    let actual = Trace::Scatter3d(Scatter3d {
        x: x0.to_vec(),
        y: x1.to_vec(),
        z: dataset.targets().to_vec(),
        mode: Mode::Markers,
        marker: Marker {
            size: SCATTER3D_MARKER_SIZE,
            color: NamedColor::Blue,
            opacity: Some(SCATTER3D_MARKER_OPACITY),
        },
        name: "Actual Data".to_string(),
    });
    let surface = Trace::Surface(Surface {
        x: to_rows(&xx),
        y: to_rows(&yy),
        z: z.to_vec().chunks(cols).map(<[f64]>::to_vec).collect(),
        opacity: SURFACE_OPACITY,
        colorscale: Colorscale::Reds,
        showscale: false,
        name: "Regression Surface".to_string(),
    });

    Ok(Chart {
        traces: vec![actual, surface],
        skeleton: LayoutSkeleton {
            title: Title {
                text: LabelSet::pick(&labels.title, "3D Linear Regression"),
            },
            axes: Axes::Scene(Scene {
                xaxis: Axis::scene(LabelSet::pick(&labels.x_label, "Feature 1")),
                yaxis: Axis::scene(LabelSet::pick(&labels.y_label, "Feature 2")),
                zaxis: Axis::scene(LabelSet::pick(&labels.z_label, "Target")),
            }),
        },
    })
}

fn regression_line<M>(model: &M, dataset: &Dataset, labels: &LabelSet) -> Result<Chart>
where
    M: Predict<f64, EstimatorError>,
{
    let x = dataset.feature(0).to_vec();
    let y_pred = model.predict(dataset.design_matrix())?;

    let actual = Trace::Scatter(Scatter {
        x: x.clone(),
        y: dataset.targets().to_vec(),
        mode: Mode::Markers,
        marker: Some(Marker {
            size: SCATTER_MARKER_SIZE,
            color: NamedColor::Blue,
            opacity: None,
        }),
        line: None,
        name: "Actual".to_string(),
    });
    let prediction = Trace::Scatter(Scatter {
        x,
        y: y_pred.to_vec(),
        mode: Mode::Lines,
        marker: None,
        line: Some(Line {
            color: NamedColor::Red,
            width: Some(PREDICTION_LINE_WIDTH),
            dash: None,
        }),
        name: "Prediction".to_string(),
    });

    Ok(Chart {
        traces: vec![actual, prediction],
        skeleton: cartesian(labels, "2D Linear Regression", "X", "y"),
    })
}

fn actual_vs_predicted<M>(model: &M, dataset: &Dataset, labels: &LabelSet) -> Result<Chart>
where
    M: Predict<f64, EstimatorError>,
{
    let y = dataset.targets();
    let y_pred = model.predict(dataset.design_matrix())?;

    let both: Array1<f64> = y.iter().chain(y_pred.iter()).copied().collect();
    let (lo, hi) = min_max(both.view()).ok_or(GeometryError::NonFiniteRange("predictions"))?;

    let pairs = Trace::Scatter(Scatter {
        x: y.to_vec(),
        y: y_pred.to_vec(),
        mode: Mode::Markers,
        marker: Some(Marker {
            size: SCATTER_MARKER_SIZE,
            color: NamedColor::Green,
            opacity: None,
        }),
        line: None,
        name: "Actual vs Predicted".to_string(),
    });
    let reference = Trace::Scatter(Scatter {
        x: vec![lo, hi],
        y: vec![lo, hi],
        mode: Mode::Lines,
        marker: None,
        line: Some(Line {
            color: NamedColor::Black,
            width: None,
            dash: Some(LineDash::Dash),
        }),
        name: "Perfect Prediction".to_string(),
    });

    Ok(Chart {
        traces: vec![pairs, reference],
        skeleton: cartesian(labels, "Actual vs Predicted", "Actual y", "Predicted y"),
    })
}

fn cartesian(labels: &LabelSet, title: &str, x_label: &str, y_label: &str) -> LayoutSkeleton {
    LayoutSkeleton {
        title: Title {
            text: LabelSet::pick(&labels.title, title),
        },
        axes: Axes::Cartesian {
            xaxis: Axis::cartesian(LabelSet::pick(&labels.x_label, x_label)),
            yaxis: Axis::cartesian(LabelSet::pick(&labels.y_label, y_label)),
        },
    }
}

fn to_rows(a: &Array2<f64>) -> Vec<Vec<f64>> {
    a.rows().into_iter().map(|row| row.to_vec()).collect()
}
