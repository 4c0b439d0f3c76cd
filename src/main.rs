//! regviz - linear regression visualization service

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use regviz::config::Cli;
use regviz::pipeline::Pipeline;
use regviz::server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .filter_level(cli.log_filter())
        .init();

    info!("regviz v{} starting", env!("CARGO_PKG_VERSION"));

    let pipeline_config = cli.pipeline_config();
    let server_config = cli.server_config();
    info!(
        "renderer: {:?}, margin policy: {:?}, plot policy: {:?}",
        pipeline_config.renderer, pipeline_config.margin_policy, pipeline_config.plot_policy
    );

    let pipeline = Arc::new(Pipeline::new(pipeline_config));
    server::serve(pipeline, &server_config)
        .await
        .with_context(|| format!("failed to serve on {}", server_config.bind_addr()))
}
