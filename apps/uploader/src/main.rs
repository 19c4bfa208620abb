//! Gallery uploader entry point.
//!
//! ```text
//! gallery-uploader [--config <path>] <request.json | ->
//! ```

mod app;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let args = app::Args::parse();

    // Load configuration.
    let config = match &args.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "starting gallery uploader"
    );

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(app::run(config, args.request_source()))? {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "upload failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
