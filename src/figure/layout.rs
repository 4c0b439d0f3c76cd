use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HEIGHT: u32 = 800;
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_AUTOSIZE: bool = true;
pub const DEFAULT_MARGIN: Margin = Margin {
    l: 120,
    r: 80,
    b: 120,
    t: 100,
    pad: 10,
};
/// Smallest left and bottom margins that keep axis titles visible.
pub const MIN_READABLE_MARGIN: u32 = 120;
/// Upper bound on the figure height and width, in pixels.
pub const MAX_DIMENSION: u32 = 10_000;

const CARTESIAN_TITLE_SIZE: u32 = 18;
const CARTESIAN_TICK_SIZE: u32 = 14;
const SCENE_TITLE_SIZE: u32 = 16;

/// Simplified `Result` using [`LayoutError`] as error type
pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout {field} must be between 1 and {max}, got {value}")]
    InvalidSize {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Font {
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisTitle {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
    pub showgrid: bool,
    pub showline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickfont: Option<Font>,
}

impl Axis {
    /// Axis of a planar chart.
    pub fn cartesian(title: impl Into<String>) -> Axis {
        Axis {
            title: AxisTitle {
                text: title.into(),
                font: Font {
                    size: CARTESIAN_TITLE_SIZE,
                },
            },
            showgrid: true,
            showline: true,
            tickfont: Some(Font {
                size: CARTESIAN_TICK_SIZE,
            }),
        }
    }

    /// Axis of a 3D scene.
    pub fn scene(title: impl Into<String>) -> Axis {
        Axis {
            title: AxisTitle {
                text: title.into(),
                font: Font {
                    size: SCENE_TITLE_SIZE,
                },
            },
            showgrid: true,
            showline: true,
            tickfont: None,
        }
    }

    pub fn title_text(&self) -> &str {
        &self.title.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub zaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axes {
    Cartesian { xaxis: Axis, yaxis: Axis },
    Scene(Scene),
}

/// Title and axes of a chart, before sizing is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSkeleton {
    pub title: Title,
    pub axes: Axes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
    pub pad: u32,
}

/// Caller-supplied margin overrides; missing keys inherit the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarginOptions {
    pub l: Option<u32>,
    pub r: Option<u32>,
    pub b: Option<u32>,
    pub t: Option<u32>,
    pub pad: Option<u32>,
}

/// Caller-supplied layout overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LayoutOptions {
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub autosize: Option<bool>,
    pub margin: Option<MarginOptions>,
}

/// Whether the left and bottom margins are raised to a minimum after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginPolicy {
    Floor(u32),
    Unrestricted,
}

impl Default for MarginPolicy {
    fn default() -> Self {
        MarginPolicy::Floor(MIN_READABLE_MARGIN)
    }
}

/// Size, autosize flag and margins after merging overrides onto defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub height: u32,
    pub width: u32,
    pub autosize: bool,
    pub margin: Margin,
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            autosize: DEFAULT_AUTOSIZE,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl MarginOptions {
    /// Key-by-key merge onto `base`.
    pub fn merge_onto(&self, base: Margin) -> Margin {
        Margin {
            l: self.l.unwrap_or(base.l),
            r: self.r.unwrap_or(base.r),
            b: self.b.unwrap_or(base.b),
            t: self.t.unwrap_or(base.t),
            pad: self.pad.unwrap_or(base.pad),
        }
    }
}

impl LayoutOptions {
    /// Merges the overrides onto the default [`Frame`]. Top-level keys replace
    /// the defaults, the margin is merged key-by-key and `policy` is applied
    /// last.
    pub fn resolve(&self, policy: MarginPolicy) -> Result<Frame> {
        let defaults = Frame::default();
        let height = check_dimension("height", self.height.unwrap_or(defaults.height))?;
        let width = check_dimension("width", self.width.unwrap_or(defaults.width))?;

        let mut margin = match &self.margin {
            Some(options) => options.merge_onto(defaults.margin),
            None => defaults.margin,
        };
        if let MarginPolicy::Floor(min) = policy {
            margin.l = margin.l.max(min);
            margin.b = margin.b.max(min);
        }

        Ok(Frame {
            height,
            width,
            autosize: self.autosize.unwrap_or(defaults.autosize),
            margin,
        })
    }
}

fn check_dimension(field: &'static str, value: u32) -> Result<u32> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(LayoutError::InvalidSize {
            field,
            value,
            max: MAX_DIMENSION,
        });
    }
    Ok(value)
}

/// Complete chart layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    pub height: u32,
    pub width: u32,
    pub autosize: bool,
    pub margin: Margin,
}

impl Layout {
    pub fn assemble(skeleton: LayoutSkeleton, frame: Frame) -> Layout {
        let (xaxis, yaxis, scene) = match skeleton.axes {
            Axes::Cartesian { xaxis, yaxis } => (Some(xaxis), Some(yaxis), None),
            Axes::Scene(scene) => (None, None, Some(scene)),
        };
        Layout {
            title: skeleton.title,
            xaxis,
            yaxis,
            scene,
            height: frame.height,
            width: frame.width,
            autosize: frame.autosize,
            margin: frame.margin,
        }
    }
}
