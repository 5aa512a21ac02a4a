use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod model;
mod parsers;
mod services;

use model::settings::Settings;
use services::{backend, pipeline::Pipeline, settings};

/// Extracts translatable blocks and keeps per-language resource files in sync.
#[derive(Debug, Parser)]
#[command(name = "autoloc", version, about)]
struct Cli {
    /// Keep polling the source tree and translate whatever changes
    #[arg(long)]
    watch: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn load_settings() -> Result<Settings> {
    let path = std::env::var_os(settings::SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(settings::DEFAULT_SETTINGS_FILE));
    let api_key = std::env::var(settings::API_KEY_ENV).ok();

    settings::load(&path, api_key)
        .with_context(|| format!("failed to load settings from {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = load_settings()?;
    let backend = backend::backend_for(&settings).context("failed to set up translation backend")?;
    let mut pipeline = Pipeline::new(&settings, backend.as_ref())?;

    if !cli.watch {
        let report = pipeline.tick().context("translation run failed")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    tracing::info!(
        event = "watch_started",
        root = %settings.root_path,
        delay_ms = settings.watch_delay_ms
    );

    loop {
        match pipeline.tick() {
            Ok(report) if report.is_idle() => {}
            Ok(report) => tracing::info!(
                event = "tick_done",
                translated = report.translated,
                written = report.written.len()
            ),
            Err(e) => tracing::error!(event = "tick_failed", error = %e),
        }

        thread::sleep(settings.watch_delay());
    }
}
