//! Extension descriptor assembly.
//!
//! Both detector modules compile the same shared C++ units with the same
//! flags and link the same libraries; they differ only in name and in the
//! source list.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::builder::scan::DependencyManifest;
use crate::core::extension::{ExtensionDescriptor, Language};
use crate::core::library::{dedup_stable, ResolvedLibraries};

/// Python package holding the extension modules.
pub const PACKAGE_NAME: &str = "pupil_detectors";

/// C++ units linked into every detector module.
pub const SHARED_SOURCES: &[&str] = &[
    "singleeyefitter/ImageProcessing/cvx.cpp",
    "singleeyefitter/utils.cpp",
    "singleeyefitter/detectorUtils.cpp",
];

/// Iterative eye model fitting, only needed by the 3D detector.
pub const MODEL_FITTING_SOURCES: &[&str] = &[
    "singleeyefitter/EyeModelFitter.cpp",
    "singleeyefitter/EyeModel.cpp",
];

/// `-w` hides warnings from the third-party headers.
pub const COMPILE_ARGS: &[&str] = &["-D_USE_MATH_DEFINES", "-std=c++11", "-w", "-O2"];

/// The detector modules this package builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorModule {
    /// 2D pupil detector
    Detector2d,
    /// 3D detector with eye model fitting
    Detector3d,
}

impl DetectorModule {
    pub const ALL: [DetectorModule; 2] = [DetectorModule::Detector2d, DetectorModule::Detector3d];

    pub fn short_name(&self) -> &'static str {
        match self {
            DetectorModule::Detector2d => "detector_2d",
            DetectorModule::Detector3d => "detector_3d",
        }
    }

    /// Dotted module name.
    pub fn module_name(&self) -> String {
        format!("{}.{}", PACKAGE_NAME, self.short_name())
    }

    /// Cython entry file.
    pub fn entry(&self) -> PathBuf {
        PathBuf::from(format!("{}.pyx", self.short_name()))
    }

    /// Full source list: entry, shared units, then module-specific units.
    pub fn sources(&self) -> Vec<PathBuf> {
        let specific: &[&str] = match self {
            DetectorModule::Detector2d => &[],
            DetectorModule::Detector3d => MODEL_FITTING_SOURCES,
        };

        std::iter::once(self.entry())
            .chain(SHARED_SOURCES.iter().chain(specific).map(PathBuf::from))
            .collect()
    }
}

impl fmt::Display for DetectorModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for DetectorModule {
    type Err = anyhow::Error;

    /// Accepts `detector_2d`, `2d`, or the dotted module name.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let short = s.strip_prefix(PACKAGE_NAME).and_then(|r| r.strip_prefix('.')).unwrap_or(s);
        match short {
            "detector_2d" | "2d" => Ok(DetectorModule::Detector2d),
            "detector_3d" | "3d" => Ok(DetectorModule::Detector3d),
            other => bail!(
                "unknown extension module `{}` (expected detector_2d or detector_3d)",
                other
            ),
        }
    }
}

/// Inputs shared by every descriptor.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionInputs<'a> {
    /// Project include directories, placed before the library include paths
    pub base_include_dirs: &'a [PathBuf],
    pub libraries: &'a ResolvedLibraries,
    pub depends: &'a DependencyManifest,
}

/// Build one descriptor per detector module: 2D first, then 3D.
pub fn build_descriptors(inputs: ExtensionInputs<'_>) -> [ExtensionDescriptor; 2] {
    let shared = shared_descriptor(inputs);
    DetectorModule::ALL.map(|module| ExtensionDescriptor {
        name: module.module_name(),
        sources: module.sources(),
        ..shared.clone()
    })
}

/// A descriptor carrying every field the modules share.
fn shared_descriptor(inputs: ExtensionInputs<'_>) -> ExtensionDescriptor {
    let include_dirs = dedup_stable(
        inputs
            .base_include_dirs
            .iter()
            .chain(&inputs.libraries.search_paths.include_dirs)
            .cloned(),
    );

    ExtensionDescriptor {
        name: String::new(),
        sources: Vec::new(),
        include_dirs,
        library_dirs: inputs.libraries.search_paths.lib_dirs.clone(),
        libraries: inputs.libraries.libraries.clone(),
        extra_link_args: Vec::new(),
        extra_compile_args: COMPILE_ARGS.iter().map(|s| s.to_string()).collect(),
        extra_objects: inputs.libraries.extra_objects.clone(),
        depends: inputs.depends.to_vec(),
        language: Language::Cxx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::SearchPathSet;
    use std::collections::BTreeSet;
    use std::path::Path;

    fn libraries() -> ResolvedLibraries {
        ResolvedLibraries {
            search_paths: SearchPathSet {
                include_dirs: vec![PathBuf::from("/usr/include/eigen3"), PathBuf::from("/cv/include")],
                lib_dirs: vec![PathBuf::from("/cv/lib")],
            },
            libraries: vec!["ceres".to_string(), "opencv_core".to_string()],
            extra_objects: Vec::new(),
        }
    }

    fn build() -> [ExtensionDescriptor; 2] {
        let base = [PathBuf::from("singleeyefitter")];
        let libs = libraries();
        let depends: DependencyManifest =
            [PathBuf::from("singleeyefitter/utils.h")].into_iter().collect();

        build_descriptors(ExtensionInputs {
            base_include_dirs: &base,
            libraries: &libs,
            depends: &depends,
        })
    }

    #[test]
    fn test_two_descriptors() {
        let [d2, d3] = build();
        assert_eq!(d2.name, "pupil_detectors.detector_2d");
        assert_eq!(d3.name, "pupil_detectors.detector_3d");
        assert_eq!(d2.entry(), Some(Path::new("detector_2d.pyx")));
        assert_eq!(d3.entry(), Some(Path::new("detector_3d.pyx")));
    }

    #[test]
    fn test_3d_adds_exactly_the_model_fitting_units() {
        let [d2, d3] = build();
        let cxx2: BTreeSet<_> = d2.cxx_sources().collect();
        let cxx3: BTreeSet<_> = d3.cxx_sources().collect();

        assert!(cxx3.is_superset(&cxx2));
        let extra: Vec<_> = cxx3.difference(&cxx2).collect();
        assert_eq!(extra.len(), 2);
        assert!(cxx3.contains(Path::new("singleeyefitter/EyeModelFitter.cpp")));
        assert!(cxx3.contains(Path::new("singleeyefitter/EyeModel.cpp")));
        assert_eq!(d3.sources.len(), d2.sources.len() + 2);
    }

    #[test]
    fn test_shared_fields_agree() {
        let [d2, d3] = build();
        assert_eq!(d2.include_dirs, d3.include_dirs);
        assert_eq!(d2.library_dirs, d3.library_dirs);
        assert_eq!(d2.libraries, d3.libraries);
        assert_eq!(d2.extra_compile_args, d3.extra_compile_args);
        assert_eq!(d2.extra_objects, d3.extra_objects);
        assert_eq!(d2.depends, d3.depends);
        assert_eq!(d2.language, Language::Cxx);
        assert_eq!(
            d2.extra_compile_args,
            vec!["-D_USE_MATH_DEFINES", "-std=c++11", "-w", "-O2"]
        );
    }

    #[test]
    fn test_descriptors_do_not_alias() {
        let [mut d2, d3] = build();
        d2.include_dirs.push(PathBuf::from("/extra"));
        d2.libraries.clear();

        assert!(!d3.include_dirs.contains(&PathBuf::from("/extra")));
        assert_eq!(d3.libraries, vec!["ceres", "opencv_core"]);
    }

    #[test]
    fn test_base_include_dirs_come_first() {
        let [d2, _] = build();
        assert_eq!(
            d2.include_dirs,
            vec![
                PathBuf::from("singleeyefitter"),
                PathBuf::from("/usr/include/eigen3"),
                PathBuf::from("/cv/include"),
            ]
        );
    }

    #[test]
    fn test_parse_module() {
        assert_eq!("2d".parse::<DetectorModule>().unwrap(), DetectorModule::Detector2d);
        assert_eq!(
            "pupil_detectors.detector_3d".parse::<DetectorModule>().unwrap(),
            DetectorModule::Detector3d
        );
        assert!("detector_4d".parse::<DetectorModule>().is_err());
    }
}
