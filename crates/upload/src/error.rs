//! Upload error types.

use std::fmt;
use std::path::PathBuf;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Resolving,
    Inspecting,
    Encoding,
    Transmitting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Resolving => "resolving",
            Stage::Inspecting => "inspecting",
            Stage::Encoding => "encoding",
            Stage::Transmitting => "transmitting",
        };
        f.write_str(name)
    }
}

/// Errors produced by the upload pipeline.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("invalid {field} value in the request, need {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("request message is not valid JSON: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    #[error("{reason}: {path}")]
    PathTraversal { path: String, reason: &'static str },

    #[error("while opening {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("is a directory: {}", .path.display())]
    IsDirectory { path: PathBuf },

    #[error("while encoding file descriptors: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("descriptor block lists {descriptors} files but {sources} sources were given")]
    SourceCount { descriptors: usize, sources: usize },

    #[error("file {index} declares {declared} bytes but its source supplies {supplied}")]
    SourceSize {
        index: usize,
        declared: u64,
        supplied: u64,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {status}")]
    Server { status: u16 },

    #[error("cancelled")]
    Cancelled,
}

impl UploadError {
    /// Returns the stage that raised this error (`None` for cancellation,
    /// which can interrupt any stage).
    pub fn stage(&self) -> Option<Stage> {
        match self {
            UploadError::TypeMismatch { .. } | UploadError::MalformedMessage(_) => {
                Some(Stage::Validating)
            }
            UploadError::PathTraversal { .. } => Some(Stage::Resolving),
            UploadError::FileOpen { .. } | UploadError::IsDirectory { .. } => {
                Some(Stage::Inspecting)
            }
            UploadError::Encoding(_)
            | UploadError::SourceCount { .. }
            | UploadError::SourceSize { .. } => Some(Stage::Encoding),
            UploadError::Transport(_) | UploadError::Server { .. } => Some(Stage::Transmitting),
            UploadError::Cancelled => None,
        }
    }

    pub(crate) fn mismatch(field: &'static str, expected: &'static str) -> Self {
        UploadError::TypeMismatch { field, expected }
    }
}
