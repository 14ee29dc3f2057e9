//! Third-party library descriptions and resolved search paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// OpenCV modules the detectors link against.
///
/// OpenCV 3 split highgui into imgcodecs, videoio and highgui itself, so all
/// three are listed.
pub const OPENCV_LIBRARIES: &[&str] = &[
    "opencv_core",
    "opencv_highgui",
    "opencv_videoio",
    "opencv_imgcodecs",
    "opencv_imgproc",
    "opencv_video",
];

/// Prefix identifying the OpenCV core library file in a directory listing.
pub const OPENCV_CORE_PREFIX: &str = "opencv_core";

/// Prefix identifying Boost.Python library files in a directory listing.
pub const BOOST_PYTHON_PREFIX: &str = "boost_python";

/// A logical library and the concrete names it resolves to on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySpec {
    /// Logical name, e.g. `opencv_core`
    pub name: String,
    /// Suffix appended to the logical name (ABI tag, soname version)
    pub suffix: Option<String>,
}

impl LibrarySpec {
    pub fn new(name: impl Into<String>) -> Self {
        LibrarySpec {
            name: name.into(),
            suffix: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    /// The name handed to the linker.
    pub fn link_name(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}{}", self.name, suffix),
            None => self.name.clone(),
        }
    }

    /// The full OpenCV module set, unsuffixed.
    pub fn opencv_set() -> Vec<LibrarySpec> {
        OPENCV_LIBRARIES.iter().map(|n| LibrarySpec::new(*n)).collect()
    }
}

/// Ordered header and library search directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPathSet {
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
}

impl SearchPathSet {
    pub fn new() -> Self {
        SearchPathSet::default()
    }

    pub fn push_include(&mut self, dir: impl Into<PathBuf>) {
        push_unique(&mut self.include_dirs, dir.into());
    }

    pub fn push_lib(&mut self, dir: impl Into<PathBuf>) {
        push_unique(&mut self.lib_dirs, dir.into());
    }

    pub fn has_lib(&self, dir: &Path) -> bool {
        self.lib_dirs.iter().any(|d| d == dir)
    }
}

/// Everything the resolver produced for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLibraries {
    pub search_paths: SearchPathSet,
    /// `-l`-style library names
    pub libraries: Vec<String>,
    /// Library files passed to the linker directly (Windows)
    pub extra_objects: Vec<String>,
}

/// Append to `list` unless an equal item is already present.
pub(crate) fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Remove duplicates keeping the first occurrence of each item.
pub(crate) fn dedup_stable<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        push_unique(&mut out, item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_name() {
        assert_eq!(LibrarySpec::new("opencv_core").link_name(), "opencv_core");
        assert_eq!(
            LibrarySpec::new("opencv_video").with_suffix("341.lib").link_name(),
            "opencv_video341.lib"
        );
        assert_eq!(LibrarySpec::new("ceres").with_suffix("").suffix, None);
    }

    #[test]
    fn test_search_paths_keep_order_without_duplicates() {
        let mut paths = SearchPathSet::new();
        paths.push_include("/b");
        paths.push_include("/a");
        paths.push_include("/b");
        assert_eq!(
            paths.include_dirs,
            vec![PathBuf::from("/b"), PathBuf::from("/a")]
        );
    }

    #[test]
    fn test_dedup_stable() {
        assert_eq!(dedup_stable(["x", "y", "x", "z", "y"]), vec!["x", "y", "z"]);
    }
}
