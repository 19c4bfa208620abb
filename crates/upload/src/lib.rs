//! Gallery upload pipeline: validate, resolve, frame and stream local files
//! to a gallery server in a single HTTP request.
//!
//! This crate holds the **upload logic** only. Whatever invokes it (a UI
//! plugin, a method channel, the `gallery-uploader` CLI) hands over one
//! request message and gets back success or a typed [`UploadError`].
//!
//! # Pipeline
//!
//! 1. **Validate**: decode the caller's message into an [`UploadRequest`]
//! 2. **Resolve**: confine paths under the base directory, or honor a forced directory
//! 3. **Inspect**: open every file in order, reject directories, sum sizes
//! 4. **Encode**: `[uvarint len][JSON descriptors][file bytes...]`, streamed lazily
//! 5. **Transmit**: one `POST <server>/add/files` with an exact `Content-Length`

pub mod envelope;
pub mod error;
pub mod inspector;
pub mod request;
pub mod resolver;
pub mod transmit;
pub mod uploader;
pub mod varint;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export primary types for convenience.
pub use envelope::{Envelope, FileDescriptor, read_header};
pub use error::{Stage, UploadError};
pub use inspector::{OpenedFiles, ResolvedFile, inspect_files};
pub use request::UploadRequest;
pub use resolver::{PathResolver, Placement, ResolvedPath};
pub use transmit::{ADD_FILES_PATH, DEVICE_ID_HEADER, Transmitter};
pub use uploader::{Uploader, UploaderOptions};
