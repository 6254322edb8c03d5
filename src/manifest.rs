//! Manifest file selection
//!
//! Works out which dependency file to upload from the `file` option and the working
//! directory, checks its name against the list of supported manifests and finds it on
//! disk with a fallback to the working directory.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{ALLOWED_PROJECT_FILES, DEFAULT_PROJECT_FILE};
use crate::exit_code::ExitCode;
use crate::messages;
use crate::report::Reporter;

/// Make `path` absolute relative to `cwd` (absolute paths are kept as-is)
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    cwd.join(path)
}

/// True for a regular file; symlinks and directories do not count
pub fn is_regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false)
}

pub fn is_directory(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Directory a `file` argument refers to
///
/// An existing directory is returned as-is, an existing file yields its parent.
/// Anything else gives `None`.
pub fn directory_from_file_argument(file: &str, cwd: &Path) -> Option<PathBuf> {
    let full = absolutize(Path::new(file), cwd);
    if is_directory(&full) {
        return Some(full);
    }
    if is_regular_file(&full) {
        return full.parent().map(Path::to_path_buf);
    }
    None
}

/// Path of the manifest to upload for a given `file` option
///
/// Without `file`, or when it names a directory, the default `package.json` is used.
pub fn project_file_path(file: Option<&str>, cwd: &Path) -> PathBuf {
    let file = file.filter(|f| !f.is_empty()).unwrap_or(".");
    let full = absolutize(Path::new(file), cwd);
    let dir = directory_from_file_argument(file, cwd).unwrap_or_else(|| cwd.to_path_buf());

    let name = if is_directory(&full) {
        DEFAULT_PROJECT_FILE.into()
    } else {
        full.file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_PROJECT_FILE.into())
    };
    dir.join(name)
}

/// Candidate locations for a manifest: the resolved path, then its name inside `cwd`
pub fn manifest_candidates(path: &Path, cwd: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];
    if let Some(name) = path.file_name() {
        let relative = cwd.join(name);
        if relative != path {
            candidates.push(relative);
        }
    }
    candidates
}

/// Allow-list of supported manifest names and patterns
pub struct ManifestFilter {
    set: GlobSet,
}

impl ManifestFilter {
    pub fn new() -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pat in ALLOWED_PROJECT_FILES {
            builder.add(Glob::new(pat)?);
        }
        Ok(ManifestFilter {
            set: builder.build()?,
        })
    }

    /// Match the base name of `path`; contents are never inspected
    pub fn is_allowed(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.set.is_match(Path::new(name)))
            .unwrap_or(false)
    }
}

/// Resolve, validate and locate the manifest named by the `file` option
///
/// Failures are reported on `out` and returned as the matching exit code.
pub fn select_manifest<W: Write>(
    file: Option<&str>,
    cwd: &Path,
    out: &mut Reporter<W>,
) -> Result<PathBuf, ExitCode> {
    let path = project_file_path(file, cwd);

    let filter = ManifestFilter::new().map_err(|err| {
        tracing::error!("invalid manifest pattern: {err}");
        ExitCode::InvalidFileType
    })?;
    if !filter.is_allowed(&path) {
        out.failure(messages::INVALID_FILE_TYPE);
        for allowed in ALLOWED_PROJECT_FILES {
            out.plain(format!("  - {allowed}"));
        }
        return Err(ExitCode::InvalidFileType);
    }

    let candidates = manifest_candidates(&path, cwd);
    for (i, candidate) in candidates.iter().enumerate() {
        if is_regular_file(candidate) {
            tracing::debug!(manifest = %candidate.display(), "manifest located");
            return Ok(candidate.clone());
        }
        if i + 1 < candidates.len() {
            out.plain(messages::relative_file_path_not_found(candidate, cwd));
        }
    }

    out.failure(messages::file_not_found(&path));
    Err(ExitCode::FileNotFound)
}
