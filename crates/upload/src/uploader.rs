//! Pipeline driver: resolve → inspect → encode → transmit.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, field, info, warn};

use crate::envelope::Envelope;
use crate::error::{Stage, UploadError};
use crate::inspector::inspect_files;
use crate::request::UploadRequest;
use crate::resolver::PathResolver;
use crate::transmit::{Transmitter, device_id_header};

/// Transport settings shared by every upload of an [`Uploader`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploaderOptions {
    /// Limit on the whole request, body included. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

/// Runs upload requests against gallery servers.
///
/// Cheap to share; concurrent uploads only share the connection pool.
#[derive(Debug, Clone)]
pub struct Uploader {
    transmitter: Transmitter,
}

impl Uploader {
    pub fn new(options: UploaderOptions) -> Result<Self, UploadError> {
        Ok(Self {
            transmitter: Transmitter::new(&options)?,
        })
    }

    /// Runs the whole pipeline for one request.
    ///
    /// Every file handle the request opened is closed by the time this returns.
    pub async fn upload(&self, request: &UploadRequest) -> Result<(), UploadError> {
        let result = self.run(request).await;
        match &result {
            Ok(()) => info!(
                files = request.file_paths.len(),
                server = %request.server_address,
                "upload complete"
            ),
            Err(e) => warn!(
                stage = e.stage().map(field::display),
                error = %e,
                "upload failed"
            ),
        }
        result
    }

    /// Like [`Uploader::upload`], but gives up with [`UploadError::Cancelled`]
    /// once `cancel` fires. Dropping the in-flight upload closes its files.
    pub async fn upload_with_cancel(
        &self,
        request: &UploadRequest,
        cancel: CancellationToken,
    ) -> Result<(), UploadError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(server = %request.server_address, "upload cancelled");
                Err(UploadError::Cancelled)
            }
            result = self.upload(request) => result,
        }
    }

    async fn run(&self, request: &UploadRequest) -> Result<(), UploadError> {
        debug!(stage = %Stage::Validating, "checking request");
        let device_id = device_id_header(&request.device_id)?;

        debug!(stage = %Stage::Resolving, files = request.file_paths.len(), "resolving paths");
        let resolved = PathResolver::for_request(request).resolve_all(&request.file_paths)?;

        debug!(stage = %Stage::Inspecting, "opening files");
        let opened = inspect_files(resolved).await?;

        debug!(stage = %Stage::Encoding, total_bytes = opened.total_size(), "framing envelope");
        let descriptors = opened.describe(request.category);
        let envelope = Envelope::encode(&descriptors, opened.into_sources())?;

        info!(
            stage = %Stage::Transmitting,
            files = descriptors.len(),
            content_length = envelope.content_length(),
            server = %request.server_address,
            "uploading"
        );
        self.transmitter
            .send(&request.server_address, device_id, envelope)
            .await
    }
}
