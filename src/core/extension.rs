//! Extension module descriptors handed to the build driver.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Source language of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "c")]
    C,
    #[default]
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cxx,
}

/// A fully specified extension module build unit.
///
/// Field names follow the keyword arguments of a setuptools `Extension`, so
/// the serialized form can be fed to the build driver unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// Dotted module name, e.g. `pupil_detectors.detector_2d`
    pub name: String,

    /// Cython entry file first, then C++ translation units
    pub sources: Vec<PathBuf>,

    pub include_dirs: Vec<PathBuf>,

    pub library_dirs: Vec<PathBuf>,

    pub libraries: Vec<String>,

    pub extra_link_args: Vec<String>,

    pub extra_compile_args: Vec<String>,

    /// Library files linked by path rather than by `-l` name
    pub extra_objects: Vec<String>,

    /// Headers whose change must trigger a rebuild
    pub depends: Vec<PathBuf>,

    pub language: Language,
}

impl ExtensionDescriptor {
    /// The Cython entry file.
    pub fn entry(&self) -> Option<&Path> {
        self.sources.first().map(PathBuf::as_path)
    }

    /// C++ translation units, excluding the Cython entry.
    pub fn cxx_sources(&self) -> impl Iterator<Item = &Path> {
        self.sources
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| p.extension().is_some_and(|e| e == "cpp"))
    }

    /// Compiler arguments (`-I` paths then extra flags) in invocation order.
    pub fn compile_flags(&self) -> Vec<String> {
        self.include_dirs
            .iter()
            .map(|d| format!("-I{}", d.display()))
            .chain(self.extra_compile_args.iter().cloned())
            .collect()
    }

    /// Linker arguments (`-L` paths, `-l` names, direct objects, extra args).
    pub fn link_flags(&self) -> Vec<String> {
        self.library_dirs
            .iter()
            .map(|d| format!("-L{}", d.display()))
            .chain(self.libraries.iter().map(|l| format!("-l{}", l)))
            .chain(self.extra_objects.iter().cloned())
            .chain(self.extra_link_args.iter().cloned())
            .collect()
    }
}
