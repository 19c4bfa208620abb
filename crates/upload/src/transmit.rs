//! Streaming transmission of an envelope.
//!
//! Async HTTP client using `reqwest`. One request per envelope, never retried.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use reqwest::{Body, StatusCode};
use tokio::io::AsyncRead;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::UploadError;
use crate::uploader::UploaderOptions;

/// Endpoint appended to the server address.
pub const ADD_FILES_PATH: &str = "/add/files";

/// Header carrying the caller's device identifier.
pub const DEVICE_ID_HEADER: &str = "deviceId";

const OCTET_STREAM: &str = "application/octet-stream";

/// Sends envelopes to a gallery server.
#[derive(Debug, Clone)]
pub struct Transmitter {
    http: reqwest::Client,
}

impl Transmitter {
    /// Creates a transmitter with the given timeouts.
    pub fn new(options: &UploaderOptions) -> Result<Self, UploadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
        })
    }

    /// POSTs `envelope` to `<server_address>/add/files`.
    ///
    /// Succeeds only on `200 OK`; the response body is never read.
    pub async fn send<R>(
        &self,
        server_address: &str,
        device_id: HeaderValue,
        envelope: Envelope<R>,
    ) -> Result<(), UploadError>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let url = add_files_url(server_address);
        let content_length = envelope.content_length();
        debug!(url = %url, content_length, files = envelope.file_count(), "sending envelope");

        let resp = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(CONTENT_LENGTH, content_length)
            .header(DEVICE_ID_HEADER, device_id)
            .body(Body::wrap_stream(envelope.into_stream()))
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(UploadError::Server {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// Builds the upload URL, tolerating one trailing `/` on the address.
pub(crate) fn add_files_url(server_address: &str) -> String {
    let origin = server_address.strip_suffix('/').unwrap_or(server_address);
    format!("{origin}{ADD_FILES_PATH}")
}

/// Checks that a device ID can travel in a header value.
pub(crate) fn device_id_header(device_id: &str) -> Result<HeaderValue, UploadError> {
    HeaderValue::from_str(device_id)
        .map_err(|_| UploadError::mismatch("deviceId", "string usable as an HTTP header value"))
}
