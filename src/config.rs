//! Command line and environment configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::figure::layout::MIN_READABLE_MARGIN;
use crate::figure::MarginPolicy;
use crate::pipeline::{PipelineConfig, PlotPolicy};
use crate::render::RendererKind;
use crate::server::ServerConfig;

/// regviz - fits linear regressions and renders them as charts over HTTP
#[derive(Debug, Clone, Parser)]
#[command(
    name = "regviz",
    version,
    about = "Fits ordinary least squares models and returns the fit as a chart",
    after_help = r#"
Request body (POST, JSON):
  {"X": [[...], ...], "y": [...], "plot": "2d" | "3d",
   "labels": {"title", "x_label", "y_label", "z_label"},
   "layout": {"height", "width", "autosize", "margin": {"l", "r", "b", "t", "pad"}}}

Environment Variables:
  REGVIZ_HOST=0.0.0.0          Listen address
  REGVIZ_PORT=8000             Listen port
  REGVIZ_ROUTE=/               Path of the regression endpoint
  REGVIZ_RENDERER=html         Output format (html, png)
  REGVIZ_LOG_LEVEL=info        Log level (error, warn, info, debug, trace)
"#
)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "REGVIZ_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "REGVIZ_PORT", default_value = "8000")]
    pub port: u16,

    /// Path of the regression endpoint
    #[arg(long, env = "REGVIZ_ROUTE", default_value = "/", value_parser = parse_route)]
    pub route: String,

    /// Output format of the rendered chart
    #[arg(long, value_enum, env = "REGVIZ_RENDERER", default_value = "html")]
    pub renderer: RendererKind,

    /// Minimum left and bottom margin in pixels
    #[arg(long, env = "REGVIZ_MARGIN_FLOOR", default_value_t = MIN_READABLE_MARGIN)]
    pub margin_floor: u32,

    /// Keep caller margins as given
    #[arg(long, env = "REGVIZ_NO_MARGIN_FLOOR")]
    pub no_margin_floor: bool,

    /// How the `plot` field is interpreted
    #[arg(long, value_enum, env = "REGVIZ_PLOT_POLICY", default_value = "permissive")]
    pub plot_policy: PlotPolicy,

    /// Maximum processing time per request, in seconds
    #[arg(long, env = "REGVIZ_TIMEOUT_SECS", default_value = "30")]
    pub timeout: u64,

    /// Maximum request body size in bytes
    #[arg(long, env = "REGVIZ_MAX_BODY_BYTES", default_value = "2097152")]
    pub max_body_bytes: usize,

    /// Enable debug logging
    #[arg(short, long, env = "REGVIZ_DEBUG")]
    pub debug: bool,

    /// Set log level
    #[arg(long, value_enum, env = "REGVIZ_LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn log_filter(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            self.log_level.into()
        }
    }

    pub fn margin_policy(&self) -> MarginPolicy {
        if self.no_margin_floor {
            MarginPolicy::Unrestricted
        } else {
            MarginPolicy::Floor(self.margin_floor)
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            renderer: self.renderer,
            margin_policy: self.margin_policy(),
            plot_policy: self.plot_policy,
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            route: self.route.clone(),
            request_timeout: Duration::from_secs(self.timeout),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

fn parse_route(route: &str) -> Result<String, String> {
    if route.starts_with('/') {
        Ok(route.to_string())
    } else {
        Err(format!("route must start with '/', got {:?}", route))
    }
}
