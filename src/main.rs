mod app;
mod args;
mod color;
mod config;
mod data;
mod source;
mod state;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;

use app::ListingsApp;
use args::Args;
use source::{DatasetSource, FileSource, HttpSource};
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = crate::config::Config::new(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;
    config.validate()?;

    let source: Box<dyn DatasetSource> = match args.file.or(config.source.path) {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new(
            config.source.url,
            &config.http.user_agent,
            config.http.timeout,
        )?),
    };
    log::info!(
        "Listings source: {} (refresh every {:?})",
        source.describe(),
        config.source.refresh
    );
    let state = AppState::new(source, config.source.refresh);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Listings – Vehicle Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(ListingsApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
