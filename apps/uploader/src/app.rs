//! Command-line handling: read one request message and drive the upload.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gallery_upload::{UploadError, UploadRequest, Uploader};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Where the request message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    Stdin,
    File(PathBuf),
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gallery-uploader", version)]
#[command(about = "Send one upload request to a gallery server", long_about = None)]
pub struct Args {
    /// Config file to use instead of the platform default.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Request message as JSON, or `-` to read it from stdin.
    #[arg(value_name = "REQUEST")]
    pub request: PathBuf,
}

impl Args {
    pub fn request_source(&self) -> RequestSource {
        if self.request.as_os_str() == "-" {
            RequestSource::Stdin
        } else {
            RequestSource::File(self.request.clone())
        }
    }
}

/// Runs one upload. The outer error covers the app itself (I/O, client
/// setup); the inner one is the pipeline's verdict.
pub async fn run(
    config: Config,
    source: RequestSource,
) -> anyhow::Result<Result<(), UploadError>> {
    let message = read_message(&source).await?;
    let request = match UploadRequest::from_json(&message) {
        Ok(request) => request,
        Err(e) => return Ok(Err(e)),
    };
    tracing::info!(
        files = request.file_paths.len(),
        server = %request.server_address,
        forced_dir = request.forced_directory().unwrap_or_default(),
        "request loaded"
    );

    let uploader = Uploader::new(config.uploader_options())?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling upload");
            trigger.cancel();
        }
    });

    Ok(uploader.upload_with_cancel(&request, cancel).await)
}

async fn read_message(source: &RequestSource) -> anyhow::Result<String> {
    match source {
        RequestSource::Stdin => {
            let mut message = String::new();
            tokio::io::stdin()
                .read_to_string(&mut message)
                .await
                .context("reading request from stdin")?;
            Ok(message)
        }
        RequestSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading request {}", path.display())),
    }
}
