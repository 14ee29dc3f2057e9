//! Library resolution for Windows hosts.

use std::path::{Path, PathBuf};

use crate::core::env::Environment;
use crate::core::host::PlatformFamily;
use crate::core::library::{
    dedup_stable, push_unique, LibrarySpec, ResolvedLibraries, SearchPathSet, BOOST_PYTHON_PREFIX,
    OPENCV_CORE_PREFIX,
};
use crate::util::fs::{absolute_path, has_entry_with_prefix, sorted_entry_names};

use super::{ConfigureError, PlatformResolver};

/// vcpkg installation prefix (`installed/<triplet>`).
pub const VCPKG_PREFIX_VAR: &str = "VCPKG_PREFIX";

/// Active conda environment; native packages live under `Library/`.
pub const CONDA_PREFIX_VAR: &str = "CONDA_PREFIX";

/// Module search path, scanned for a directory shipping OpenCV binaries.
pub const PYTHONPATH_VAR: &str = "PYTHONPATH";

/// Ceres and glog are always linked as these files.
pub const OPTIMIZATION_LIBRARIES: &[&str] = &["ceres.lib", "glog.lib"];

const PYTHONPATH_SEPARATOR: char = ';';

/// Resolver for vcpkg/conda style installations.
#[derive(Debug, Clone, Default)]
pub struct WindowsResolver;

impl WindowsResolver {
    pub fn new() -> Self {
        WindowsResolver
    }

    /// Collect installation prefixes, in priority order, as absolute paths.
    pub fn candidate_prefixes(&self, env: &Environment) -> Result<Vec<PathBuf>, ConfigureError> {
        let mut prefixes = Vec::new();
        let mut searched = Vec::new();

        match env.get(VCPKG_PREFIX_VAR) {
            Some(prefix) => prefixes.push(PathBuf::from(prefix)),
            None => searched.push(format!("{} (not set)", VCPKG_PREFIX_VAR)),
        }

        match env.get(CONDA_PREFIX_VAR) {
            Some(prefix) => prefixes.push(Path::new(prefix).join("Library")),
            None => searched.push(format!("{} (not set)", CONDA_PREFIX_VAR)),
        }

        match env.get(PYTHONPATH_VAR) {
            Some(paths) => match find_opencv_on_pythonpath(paths) {
                Some(prefix) => prefixes.push(prefix),
                None => searched.push(format!(
                    "{} entries for {}* files: {}",
                    PYTHONPATH_VAR, OPENCV_CORE_PREFIX, paths
                )),
            },
            None => searched.push(format!("{} (not set)", PYTHONPATH_VAR)),
        }

        if prefixes.is_empty() {
            return Err(ConfigureError::NoLibraryDirectory { searched });
        }

        let mut absolute = Vec::new();
        for prefix in &prefixes {
            push_unique(&mut absolute, absolute_path(prefix));
        }
        for prefix in &absolute {
            tracing::debug!("library prefix: {}", prefix.display());
        }
        Ok(absolute)
    }

    /// Scan a prefix's `lib` directory for the OpenCV ABI suffix and
    /// Boost.Python files.
    ///
    /// Entries are examined in lexicographic order. The first `opencv_core*`
    /// entry decides the suffix for the whole directory.
    fn scan_library_dir(
        &self,
        prefix: &Path,
    ) -> Result<(Option<String>, Vec<String>), ConfigureError> {
        let lib_dir = prefix.join("lib");
        let names = sorted_entry_names(&lib_dir).map_err(|source| {
            ConfigureError::UnreadableLibraryDirectory {
                path: lib_dir.clone(),
                prefix: prefix.to_path_buf(),
                source,
            }
        })?;

        let mut suffix: Option<String> = None;
        let mut boost = Vec::new();

        for name in names {
            if let Some(rest) = name.strip_prefix(OPENCV_CORE_PREFIX) {
                match &suffix {
                    None => {
                        tracing::debug!(
                            "opencv suffix `{}` from {}",
                            rest,
                            lib_dir.join(&name).display()
                        );
                        suffix = Some(rest.to_string());
                    }
                    Some(chosen) if chosen != rest => {
                        tracing::debug!(
                            "ignoring {} (suffix `{}` already chosen)",
                            lib_dir.join(&name).display(),
                            chosen
                        );
                    }
                    Some(_) => {}
                }
            } else if name.starts_with(BOOST_PYTHON_PREFIX) {
                boost.push(name);
            }
        }

        Ok((suffix, boost))
    }
}

/// Find the first module search path entry that holds OpenCV binaries and
/// return its parent as the installation prefix.
fn find_opencv_on_pythonpath(paths: &str) -> Option<PathBuf> {
    paths
        .split(PYTHONPATH_SEPARATOR)
        .filter(|p| !p.is_empty())
        .map(Path::new)
        .find(|dir| dir.is_dir() && has_entry_with_prefix(dir, OPENCV_CORE_PREFIX))
        .map(pythonpath_prefix)
}

/// The absolute installation prefix above a module search path entry.
///
/// A bare relative entry such as `bin` has an empty parent, which is the
/// current directory.
fn pythonpath_prefix(entry: &Path) -> PathBuf {
    match entry.parent() {
        Some(parent) => absolute_path(parent),
        None => absolute_path(entry),
    }
}

impl PlatformResolver for WindowsResolver {
    fn family(&self) -> PlatformFamily {
        PlatformFamily::Windows
    }

    fn resolve_search_paths(&self, env: &Environment) -> Result<SearchPathSet, ConfigureError> {
        let mut paths = SearchPathSet::new();
        for prefix in self.candidate_prefixes(env)? {
            paths.push_include(prefix.join("include"));
            paths.push_lib(prefix.join("lib"));
        }
        Ok(paths)
    }

    fn resolve_libraries(
        &self,
        env: &Environment,
        paths: &SearchPathSet,
    ) -> Result<ResolvedLibraries, ConfigureError> {
        let mut opencv = Vec::new();
        let mut boost = Vec::new();

        for prefix in self.candidate_prefixes(env)? {
            if !paths.has_lib(&prefix.join("lib")) {
                continue;
            }
            let (suffix, boost_files) = self.scan_library_dir(&prefix)?;
            if let Some(suffix) = suffix {
                opencv.extend(
                    LibrarySpec::opencv_set()
                        .into_iter()
                        .map(|lib| lib.with_suffix(suffix.as_str()).link_name()),
                );
            }
            boost.extend(boost_files);
        }

        if opencv.is_empty() {
            tracing::warn!(
                "no {}* library found in {} library director{}",
                OPENCV_CORE_PREFIX,
                paths.lib_dirs.len(),
                if paths.lib_dirs.len() == 1 { "y" } else { "ies" }
            );
        }

        let extra_objects = dedup_stable(opencv)
            .into_iter()
            .chain(dedup_stable(boost))
            .chain(OPTIMIZATION_LIBRARIES.iter().map(|s| s.to_string()))
            .collect();

        Ok(ResolvedLibraries {
            search_paths: paths.clone(),
            libraries: Vec::new(),
            extra_objects,
        })
    }
}
