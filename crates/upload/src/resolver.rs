//! Resolution of caller-supplied paths to openable file locations.
//!
//! Without an override every path must sit under the trusted base directory;
//! with one, paths are taken as already resolved and the override becomes the
//! descriptor directory.

use std::path::{Component, Path, PathBuf, is_separator};

use crate::error::UploadError;
use crate::request::UploadRequest;

/// Where resolved files may live and which `dir` their descriptors carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Paths must begin with `base`; `dir` is derived from the relative remainder.
    Confined { base: String },
    /// Paths are opened as given; `dir` is always `dir`.
    Forced { dir: String },
}

/// A path that passed resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Location handed to the filesystem.
    pub location: PathBuf,
    /// Path relative to the base directory (the input path when forced).
    pub relative: String,
    /// Final path component, sent as the descriptor `name`.
    pub name: String,
    /// Descriptor `dir`.
    pub dir: String,
}

/// Turns request paths into [`ResolvedPath`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    placement: Placement,
}

impl PathResolver {
    /// Resolver that confines every path under `base`.
    pub fn confined(base: impl Into<String>) -> Self {
        Self {
            placement: Placement::Confined { base: base.into() },
        }
    }

    /// Resolver that opens paths as given and reports `dir` for all of them.
    pub fn forced(dir: impl Into<String>) -> Self {
        Self {
            placement: Placement::Forced { dir: dir.into() },
        }
    }

    /// Picks the placement a request asks for.
    pub fn for_request(request: &UploadRequest) -> Self {
        match request.forced_directory() {
            Some(dir) => Self::forced(dir),
            None => Self::confined(request.base_directory.clone()),
        }
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Resolves every path, in order. Fails on the first rejected path.
    pub fn resolve_all(&self, paths: &[String]) -> Result<Vec<ResolvedPath>, UploadError> {
        paths.iter().map(|path| self.resolve(path)).collect()
    }

    /// Resolves a single path.
    pub fn resolve(&self, path: &str) -> Result<ResolvedPath, UploadError> {
        match &self.placement {
            Placement::Confined { base } => resolve_confined(base, path),
            Placement::Forced { dir } => Ok(ResolvedPath {
                location: PathBuf::from(path),
                relative: path.to_string(),
                name: file_name(path),
                dir: dir.clone(),
            }),
        }
    }
}

fn resolve_confined(base: &str, path: &str) -> Result<ResolvedPath, UploadError> {
    let rest = path
        .strip_prefix(base)
        .ok_or_else(|| traversal(path, "path does not begin with the base directory"))?;

    // `/rootkit/x` starts with `/root` as a string but is not inside it.
    let on_boundary = rest.is_empty()
        || base.is_empty()
        || base.ends_with(is_separator)
        || rest.starts_with(is_separator);
    if !on_boundary {
        return Err(traversal(path, "path does not begin with the base directory"));
    }

    let mut parts = Vec::new();
    for component in Path::new(rest.trim_matches(is_separator)).components() {
        match component {
            Component::ParentDir => {
                return Err(traversal(path, "parent directory traversal not allowed"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "path prefix not allowed"));
            }
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }

    // Normal components only, joined with `/`.
    let relative = parts.join("/");
    let (name, dir) = match parts.split_last() {
        Some((name, dirs)) => (name.clone(), dirs.join("/")),
        None => (String::new(), String::new()),
    };

    Ok(ResolvedPath {
        location: Path::new(base).join(&relative),
        relative,
        name,
        dir,
    })
}

fn traversal(path: &str, reason: &'static str) -> UploadError {
    UploadError::PathTraversal {
        path: path.to_string(),
        reason,
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
