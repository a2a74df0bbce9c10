use std::path::Path;

use anyhow::{Context, Result};
use renderer::{RendererConfig, StillConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{RunArgs, StillArgs};
use crate::settings;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run_window(args: RunArgs) -> Result<()> {
    let loaded = settings::load(args.config.as_deref())?;
    let config = &loaded.config;

    let renderer_config = RendererConfig {
        title: args.title.unwrap_or_else(|| config.window.title.clone()),
        window_size: args
            .size
            .unwrap_or((config.window.width, config.window.height)),
        fullscreen: args.fullscreen || config.window.fullscreen,
        gpu: settings::gpu_options(config),
    };
    tracing::info!(
        title = %renderer_config.title,
        width = renderer_config.window_size.0,
        height = renderer_config.window_size.1,
        fullscreen = renderer_config.fullscreen,
        "opening hero window"
    );

    renderer::run_window(renderer_config).context("hero window failed")
}

pub fn run_still(config_path: Option<&Path>, args: StillArgs) -> Result<()> {
    let loaded = settings::load(config_path)?;
    let config = &loaded.config;

    let still = StillConfig {
        output: args.output,
        time: args.time.unwrap_or(config.still.time),
        size: args
            .size
            .unwrap_or((config.still.width, config.still.height)),
        pixel_ratio: args.pixel_ratio.unwrap_or(config.still.pixel_ratio),
        gpu: settings::gpu_options(config),
    };

    let path = renderer::render_still(&still)?;
    println!("{}", path.display());
    Ok(())
}
