//! Library resolution for Linux, macOS and other POSIX hosts.

use std::path::{Path, PathBuf};

use crate::core::env::Environment;
use crate::core::host::{HostInfo, HostOs, PlatformFamily, PythonVersion};
use crate::core::library::{LibrarySpec, ResolvedLibraries, SearchPathSet};
use crate::util::config::{Config, DEFAULT_OPENCV_PREFIX};

use super::{ConfigureError, PlatformResolver};

/// Eigen header directories, searched before the OpenCV headers.
pub const EIGEN_INCLUDE_DIRS: &[&str] = &["/usr/local/include/eigen3", "/usr/include/eigen3"];

/// Ceres is linked by name on POSIX.
pub const CERES_LIBRARY: &str = "ceres";

/// Header directory of the OpenCV 3 build shipped with ROS.
const ROS_OPENCV_INCLUDE: &str = "opencv-3.1.0-dev";

/// ROS ships numbered sonames (`libopencv_core3.so`).
const ROS_OPENCV_SUFFIX: &str = "3";

/// One place OpenCV may be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenCvInstall {
    /// Human-readable origin, used in logs
    pub origin: String,
    pub lib_dir: PathBuf,
    pub include_dir: PathBuf,
    /// File whose presence confirms the installation
    pub probe: PathBuf,
    /// Suffix appended to every OpenCV library name
    pub suffix: Option<String>,
}

impl OpenCvInstall {
    /// A plain OpenCV prefix with `lib/libopencv_core.so`.
    pub fn prefix(prefix: &Path) -> Self {
        let lib_dir = prefix.join("lib");
        OpenCvInstall {
            origin: prefix.display().to_string(),
            probe: lib_dir.join("libopencv_core.so"),
            lib_dir,
            include_dir: prefix.join("include"),
            suffix: None,
        }
    }

    /// OpenCV 3 bundled with a ROS distribution.
    pub fn ros(ros_root: &Path, distribution: &str) -> Self {
        let dist_root = ros_root.join(distribution);
        let lib_dir = dist_root.join("lib");
        OpenCvInstall {
            origin: format!("ROS {}", distribution),
            probe: lib_dir.join(format!("libopencv_core{}.so", ROS_OPENCV_SUFFIX)),
            lib_dir,
            include_dir: dist_root.join("include").join(ROS_OPENCV_INCLUDE),
            suffix: Some(ROS_OPENCV_SUFFIX.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        self.probe.is_file()
    }

    /// OpenCV library names for this installation.
    pub fn libraries(&self) -> Vec<String> {
        LibrarySpec::opencv_set()
            .into_iter()
            .map(|lib| match &self.suffix {
                Some(suffix) => lib.with_suffix(suffix.as_str()),
                None => lib,
            })
            .map(|lib| lib.link_name())
            .collect()
    }
}

/// Resolver for system-package-manager installations.
///
/// Candidates are tried in order and the first present one wins. When none
/// is present the first candidate is used anyway; POSIX hosts are expected
/// to be provisioned by the system package manager, so the compiler gets
/// to report what is missing.
#[derive(Debug, Clone)]
pub struct PosixResolver {
    os: HostOs,
    python: PythonVersion,
    candidates: Vec<OpenCvInstall>,
}

impl PosixResolver {
    /// Create a resolver with an explicit candidate list. The first candidate
    /// is the default used when nothing is found.
    pub fn new(os: HostOs, python: PythonVersion, candidates: Vec<OpenCvInstall>) -> Self {
        PosixResolver {
            os,
            python,
            candidates,
        }
    }

    /// Build the candidate list from configuration: the OpenCV prefix, then
    /// each ROS distribution in order.
    pub fn from_config(host: &HostInfo, config: &Config) -> Self {
        let ros_root = config.ros_root();
        let candidates = std::iter::once(OpenCvInstall::prefix(&config.opencv_prefix()))
            .chain(
                config
                    .ros_distributions()
                    .iter()
                    .map(|dist| OpenCvInstall::ros(&ros_root, dist)),
            )
            .collect();

        PosixResolver::new(host.os.clone(), host.python, candidates)
    }

    pub fn candidates(&self) -> &[OpenCvInstall] {
        &self.candidates
    }

    /// The first present installation, or the default one.
    pub fn select_installation(&self) -> OpenCvInstall {
        if let Some(found) = self.candidates.iter().find(|c| c.is_present()) {
            tracing::debug!("using OpenCV from {}", found.origin);
            return found.clone();
        }

        let default = self
            .candidates
            .first()
            .cloned()
            .unwrap_or_else(|| OpenCvInstall::prefix(Path::new(DEFAULT_OPENCV_PREFIX)));
        tracing::warn!(
            "OpenCV not found (probed {}); keeping default paths from {}",
            self.candidates
                .iter()
                .map(|c| c.probe.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            default.origin
        );
        default
    }

    /// Boost.Python library name for the target interpreter.
    ///
    /// Linux distributions name it `boost_python-py36`, others `boost_python36`.
    pub fn boost_python_library(&self) -> String {
        let separator = if self.os == HostOs::Linux { "-py" } else { "" };
        format!(
            "boost_python{}{}{}",
            separator, self.python.major, self.python.minor
        )
    }
}

impl PlatformResolver for PosixResolver {
    fn family(&self) -> PlatformFamily {
        PlatformFamily::Posix
    }

    fn resolve_search_paths(&self, _env: &Environment) -> Result<SearchPathSet, ConfigureError> {
        let install = self.select_installation();

        let mut paths = SearchPathSet::new();
        for dir in EIGEN_INCLUDE_DIRS {
            paths.push_include(*dir);
        }
        paths.push_include(install.include_dir);
        paths.push_lib(install.lib_dir);
        Ok(paths)
    }

    fn resolve_libraries(
        &self,
        _env: &Environment,
        paths: &SearchPathSet,
    ) -> Result<ResolvedLibraries, ConfigureError> {
        // Follow the installation already chosen for the search paths.
        let install = self
            .candidates
            .iter()
            .find(|c| paths.has_lib(&c.lib_dir))
            .cloned()
            .unwrap_or_else(|| self.select_installation());

        let libraries = [CERES_LIBRARY.to_string(), self.boost_python_library()]
            .into_iter()
            .chain(install.libraries())
            .collect();

        Ok(ResolvedLibraries {
            search_paths: paths.clone(),
            libraries,
            extra_objects: Vec::new(),
        })
    }
}
