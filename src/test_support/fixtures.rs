//! Filesystem fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// A `pupil_detectors` source directory with Cython entries, the shared
/// C++ units and a nested header tree.
#[derive(Debug, Clone)]
pub struct SourceTreeFixture {
    /// Files relative to the source root -> content.
    pub files: BTreeMap<PathBuf, String>,
}

impl Default for SourceTreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTreeFixture {
    /// The standard detector layout.
    pub fn new() -> Self {
        let mut files = BTreeMap::new();
        for entry in ["detector_2d.pyx", "detector_3d.pyx"] {
            files.insert(PathBuf::from(entry), "# cython: language_level=3\n".to_string());
        }
        for source in [
            "singleeyefitter/ImageProcessing/cvx.cpp",
            "singleeyefitter/utils.cpp",
            "singleeyefitter/detectorUtils.cpp",
            "singleeyefitter/EyeModelFitter.cpp",
            "singleeyefitter/EyeModel.cpp",
        ] {
            files.insert(PathBuf::from(source), "// translation unit\n".to_string());
        }
        for header in [
            "singleeyefitter/utils.h",
            "singleeyefitter/cvx.h",
            "singleeyefitter/common/types.h",
            "singleeyefitter/common/colors.h",
            "singleeyefitter/ImageProcessing/cvx.h",
        ] {
            files.insert(PathBuf::from(header), "#pragma once\n".to_string());
        }
        SourceTreeFixture { files }
    }

    /// Add or replace a file.
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Write the tree into a fresh temporary directory.
    pub fn build(&self) -> TempDir {
        let tmp = TempDir::new().expect("create temp dir");
        for (path, content) in &self.files {
            let full = tmp.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("create fixture dir");
            }
            fs::write(&full, content).expect("write fixture file");
        }
        tmp
    }
}

/// An installation prefix with `include/` and `lib/` directories.
#[derive(Debug, Clone, Default)]
pub struct LibraryPrefixFixture {
    lib_files: Vec<String>,
}

impl LibraryPrefixFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an (empty) file to `lib/`.
    pub fn lib_file(mut self, name: impl Into<String>) -> Self {
        self.lib_files.push(name.into());
        self
    }

    /// Write the prefix into a fresh temporary directory.
    pub fn build(&self) -> TempDir {
        let tmp = TempDir::new().expect("create temp dir");
        fs::create_dir_all(tmp.path().join("include")).expect("create include dir");
        fs::create_dir_all(tmp.path().join("lib")).expect("create lib dir");
        for name in &self.lib_files {
            fs::write(tmp.path().join("lib").join(name), "").expect("write library file");
        }
        tmp
    }
}
