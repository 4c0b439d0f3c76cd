//! Renderer-agnostic chart model.
//!
//! The types serialize to the JSON shapes understood by plotly.js, which the
//! interactive renderer embeds as-is. The image renderer walks the same
//! structures.

use serde::Serialize;

use crate::render::RenderError;


pub mod layout;

pub use layout::{Axes, Axis, Layout, LayoutOptions, LayoutSkeleton, Margin, MarginOptions, MarginPolicy};

/// Marker or line color. Only the palette used by the regression charts is
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Blue,
    Red,
    Green,
    Black,
}

/// Continuous color scale applied to surfaces along their z values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Colorscale {
    Reds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Markers,
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: f64,
    pub color: NamedColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: NamedColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<LineDash>,
}

/// Planar series drawn either as markers or as a polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    pub name: String,
}

/// Markers placed in a 3D scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter3d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub mode: Mode,
    pub marker: Marker,
    pub name: String,
}

/// Surface sampled on a rectangular grid. `x`, `y` and `z` share the same
/// `(rows, columns)` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<f64>>,
    pub opacity: f64,
    pub colorscale: Colorscale,
    pub showscale: bool,
    pub name: String,
}

/// One renderable data series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(Scatter),
    Scatter3d(Scatter3d),
    Surface(Surface),
}

impl Trace {
    pub fn kind(&self) -> &'static str {
        match self {
            Trace::Scatter(_) => "scatter",
            Trace::Scatter3d(_) => "scatter3d",
            Trace::Surface(_) => "surface",
        }
    }

    pub fn is_three_d(&self) -> bool {
        matches!(self, Trace::Scatter3d(_) | Trace::Surface(_))
    }
}

/// Traces together with the fully resolved layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Checks that every trace can be drawn in the coordinate system the
    /// layout declares: 3D traces need a scene, planar traces need cartesian
    /// axes.
    pub fn check_compatible(&self) -> Result<(), RenderError> {
        if self.traces.is_empty() {
            return Err(RenderError::EmptyFigure);
        }
        let scene = self.layout.scene.is_some();
        match self.traces.iter().find(|t| t.is_three_d() != scene) {
            Some(trace) => Err(RenderError::IncompatibleTrace {
                trace: trace.kind(),
                layout: if scene { "scene" } else { "cartesian" },
            }),
            None => Ok(()),
        }
    }
}
