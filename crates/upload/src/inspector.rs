//! Opening and inspecting resolved files.
//!
//! Handles are owned values: whichever exit the pipeline takes, every handle
//! opened so far is closed exactly once when its owner drops.

use tokio::fs::File;
use tracing::debug;

use crate::envelope::FileDescriptor;
use crate::error::UploadError;
use crate::resolver::ResolvedPath;

/// An open, inspected file ready for streaming.
#[derive(Debug)]
pub struct ResolvedFile {
    pub file: File,
    pub path: ResolvedPath,
    /// Byte size at inspection time.
    pub size: u64,
}

/// Every file of one upload, opened and inspected, in request order.
#[derive(Debug, Default)]
pub struct OpenedFiles {
    files: Vec<ResolvedFile>,
    total_size: u64,
}

impl OpenedFiles {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn files(&self) -> &[ResolvedFile] {
        &self.files
    }

    /// Builds one descriptor per file, tagged with `category`.
    pub fn describe(&self, category: i64) -> Vec<FileDescriptor> {
        self.files
            .iter()
            .map(|f| FileDescriptor {
                name: f.path.name.clone(),
                dir: f.path.dir.clone(),
                size: f.size,
                category,
            })
            .collect()
    }

    /// Hands the handles over, paired with their inspected sizes.
    pub fn into_sources(self) -> Vec<(File, u64)> {
        self.files.into_iter().map(|f| (f.file, f.size)).collect()
    }
}

/// Opens every path in order, then inspects each handle.
///
/// The first open failure aborts with [`UploadError::FileOpen`]; a directory
/// aborts with [`UploadError::IsDirectory`]. Either way the handles opened up
/// to that point are dropped, and so closed, before the error is returned.
pub async fn inspect_files(paths: Vec<ResolvedPath>) -> Result<OpenedFiles, UploadError> {
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        match File::open(&path.location).await {
            Ok(file) => handles.push((file, path)),
            Err(source) => {
                debug!(
                    path = %path.location.display(),
                    released = handles.len(),
                    "open failed, releasing handles"
                );
                return Err(UploadError::FileOpen {
                    path: path.location,
                    source,
                });
            }
        }
    }

    let mut opened = OpenedFiles {
        files: Vec::with_capacity(handles.len()),
        total_size: 0,
    };
    for (file, path) in handles {
        let metadata = match file.metadata().await {
            Ok(metadata) => metadata,
            Err(source) => {
                return Err(UploadError::FileOpen {
                    path: path.location,
                    source,
                });
            }
        };
        if metadata.is_dir() {
            return Err(UploadError::IsDirectory {
                path: path.location,
            });
        }

        let size = metadata.len();
        opened.total_size += size;
        opened.files.push(ResolvedFile { file, path, size });
    }

    debug!(
        files = opened.len(),
        total_bytes = opened.total_size,
        "inspection complete"
    );
    Ok(opened)
}
