//! Header dependency scanning.
//!
//! The header set is not compiled; it is recorded on each extension so the
//! build driver rebuilds when any header changes.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::util::config::DEFAULT_HEADER_SUFFIXES;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::relative_path;
use crate::util::hash::{sha256_file, Fingerprint};

/// Error while scanning a header tree.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ScanError {
    #[error("cannot access header directory `{}`", .path.display())]
    #[diagnostic(code(pupil_build::scan::root_inaccessible))]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan `{}`", .path.display())]
    #[diagnostic(code(pupil_build::scan::walk_failed))]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ScanError::RootInaccessible { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string())
                .with_suggestion(suggestions::CHECK_SOURCE_ROOT),
            ScanError::Walk { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string()),
        }
    }
}

/// The set of headers an extension depends on.
///
/// Iteration order is sorted, which keeps serialized plans stable, but the
/// set carries no meaningful order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyManifest {
    headers: BTreeSet<PathBuf>,
}

impl DependencyManifest {
    pub fn new() -> Self {
        DependencyManifest::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.headers.insert(path.into())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.headers.contains(path)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.headers.iter().map(PathBuf::as_path)
    }

    /// The headers as a list, for `depends=`.
    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.headers.iter().cloned().collect()
    }

    /// Re-express every path relative to `base`.
    pub fn relative_to(&self, base: &Path) -> DependencyManifest {
        self.headers
            .iter()
            .map(|p| relative_path(base, p))
            .collect()
    }

    /// Content fingerprint of the header set.
    ///
    /// Covers every path and the bytes of every header, so adding, removing,
    /// renaming or editing a header changes the result. Relative paths are
    /// read from under `base`.
    pub fn fingerprint(&self, base: &Path) -> Result<String> {
        let mut fp = Fingerprint::new();
        for header in &self.headers {
            let hash = sha256_file(&base.join(header))?;
            fp.update_str(&header.to_string_lossy()).update_str(&hash);
        }
        Ok(fp.finish())
    }
}

impl FromIterator<PathBuf> for DependencyManifest {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        DependencyManifest {
            headers: iter.into_iter().collect(),
        }
    }
}

/// Recursive header finder.
#[derive(Debug, Clone)]
pub struct HeaderScanner {
    suffixes: Vec<String>,
}

impl Default for HeaderScanner {
    fn default() -> Self {
        HeaderScanner::new(DEFAULT_HEADER_SUFFIXES.iter().map(|s| s.to_string()))
    }
}

impl HeaderScanner {
    pub fn new(suffixes: impl IntoIterator<Item = String>) -> Self {
        HeaderScanner {
            suffixes: suffixes.into_iter().collect(),
        }
    }

    pub fn is_header(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|s| file_name.ends_with(s.as_str()))
    }

    /// Collect every header below `root`.
    ///
    /// The root itself must be a readable directory. Entries that disappear
    /// while walking are skipped; any other I/O error aborts the scan, since
    /// a partial manifest would hide changes from the build driver.
    pub fn scan(&self, root: &Path) -> Result<DependencyManifest, ScanError> {
        let meta = std::fs::metadata(root).map_err(|source| ScanError::RootInaccessible {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(ScanError::RootInaccessible {
                path: root.to_path_buf(),
                source: io::Error::other("not a directory"),
            });
        }

        let mut manifest = DependencyManifest::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    if err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) {
                        tracing::debug!("skipping vanished entry {}", path.display());
                        continue;
                    }
                    return Err(ScanError::Walk {
                        path,
                        source: err.into(),
                    });
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }
            if self.is_header(&entry.file_name().to_string_lossy()) {
                manifest.insert(entry.into_path());
            }
        }

        tracing::debug!("found {} headers under {}", manifest.len(), root.display());
        Ok(manifest)
    }
}

/// Scan `root` for `.h` files.
pub fn scan_headers(root: &Path) -> Result<DependencyManifest, ScanError> {
    HeaderScanner::default().scan(root)
}
