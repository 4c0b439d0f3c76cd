use serde::Serialize;
use thiserror::Error;

use crate::figure::Figure;


pub mod html;
pub mod png;

pub use self::html::HtmlRenderer;
pub use self::png::PngRenderer;

/// Simplified `Result` using [`RenderError`] as error type
pub type Result<T> = std::result::Result<T, RenderError>;

/// Error variants raised while turning a [`Figure`] into an artifact
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("figure has no traces")]
    EmptyFigure,
    #[error("{trace} trace cannot be drawn on a {layout} layout")]
    IncompatibleTrace {
        trace: &'static str,
        layout: &'static str,
    },
    #[error("failed to serialize figure: {0}")]
    Serialize(String),
    #[error("drawing backend error: {0}")]
    Backend(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("image of {width}x{height} pixels exceeds the {max}x{max} raster limit")]
    CanvasTooLarge { width: u32, height: u32, max: u32 },
}

/// The rendered chart, serialized as the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotArtifact {
    /// Self-contained interactive HTML page.
    Html(String),
    /// PNG image, base64 encoded with the standard alphabet.
    ImageBase64(String),
}

impl PlotArtifact {
    /// Response key the artifact is serialized under.
    pub fn kind(&self) -> &'static str {
        match self {
            PlotArtifact::Html(_) => "html",
            PlotArtifact::ImageBase64(_) => "image_base64",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PlotArtifact::Html(s) | PlotArtifact::ImageBase64(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rendering capability shared by the interactive and the image backends.
///
/// Implementations must not keep per-figure state between calls so that one
/// instance can serve concurrent requests.
pub trait Renderer: Send + Sync {
    fn render(&self, figure: &Figure) -> Result<PlotArtifact>;
}

/// Backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RendererKind {
    /// Interactive plotly.js document
    #[default]
    Html,
    /// Base64 encoded PNG image
    Png,
}

impl RendererKind {
    pub fn build(self) -> Box<dyn Renderer> {
        match self {
            RendererKind::Html => Box::new(HtmlRenderer::default()),
            RendererKind::Png => Box::new(PngRenderer),
        }
    }
}
