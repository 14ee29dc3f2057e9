//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.pupil-build/config.toml` - User-wide defaults
//! - Project: `.pupil-build/config.toml` under the source root
//!
//! Project config takes precedence over global config. Every setting is
//! optional; unset values fall back to the built-in layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs::read_to_string;

/// Default OpenCV install prefix probed on POSIX hosts.
pub const DEFAULT_OPENCV_PREFIX: &str = "/usr/local/opt/opencv";

/// Root under which ROS distributions are installed.
pub const DEFAULT_ROS_ROOT: &str = "/opt/ros";

/// ROS distributions known to ship OpenCV 3, newest first.
pub const DEFAULT_ROS_DISTRIBUTIONS: &[&str] = &["kinetic", "jade", "indigo"];

/// Suffixes identifying header files.
pub const DEFAULT_HEADER_SUFFIXES: &[&str] = &[".h"];

/// Default number of cythonize worker threads.
pub const DEFAULT_CYTHON_NTHREADS: usize = 8;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".pupil-build";

/// pupil-build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Installation layout overrides
    pub paths: PathsConfig,

    /// Dependency scanning settings
    pub scan: ScanConfig,

    /// Options forwarded to cythonize
    pub cython: CythonConfig,
}

/// Installation layout used by the POSIX resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// OpenCV prefix containing `lib/` and `include/`
    pub opencv_prefix: Option<PathBuf>,

    /// Directory holding ROS distributions
    pub ros_root: Option<PathBuf>,

    /// ROS distributions to probe, in order
    pub ros_distributions: Option<Vec<String>>,
}

/// Dependency scanning settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File name suffixes treated as headers
    pub header_suffixes: Option<Vec<String>>,
}

/// Options forwarded to cythonize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CythonConfig {
    pub nthreads: Option<usize>,
    pub quiet: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.paths.opencv_prefix.is_some() {
            self.paths.opencv_prefix = other.paths.opencv_prefix;
        }
        if other.paths.ros_root.is_some() {
            self.paths.ros_root = other.paths.ros_root;
        }
        if other.paths.ros_distributions.is_some() {
            self.paths.ros_distributions = other.paths.ros_distributions;
        }

        if other.scan.header_suffixes.is_some() {
            self.scan.header_suffixes = other.scan.header_suffixes;
        }

        if other.cython.nthreads.is_some() {
            self.cython.nthreads = other.cython.nthreads;
        }
        if other.cython.quiet.is_some() {
            self.cython.quiet = other.cython.quiet;
        }
    }

    pub fn opencv_prefix(&self) -> PathBuf {
        self.paths
            .opencv_prefix
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OPENCV_PREFIX))
    }

    pub fn ros_root(&self) -> PathBuf {
        self.paths
            .ros_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROS_ROOT))
    }

    pub fn ros_distributions(&self) -> Vec<String> {
        self.paths.ros_distributions.clone().unwrap_or_else(|| {
            DEFAULT_ROS_DISTRIBUTIONS
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn header_suffixes(&self) -> Vec<String> {
        self.scan.header_suffixes.clone().unwrap_or_else(|| {
            DEFAULT_HEADER_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn cython_nthreads(&self) -> usize {
        self.cython.nthreads.unwrap_or(DEFAULT_CYTHON_NTHREADS)
    }

    pub fn cython_quiet(&self) -> bool {
        self.cython.quiet.unwrap_or(true)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.pupil-build/config.toml)
/// 2. Global config (~/.pupil-build/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config path (~/.pupil-build/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Get the project config path (.pupil-build/config.toml).
pub fn project_config_path(source_root: &Path) -> PathBuf {
    source_root.join(CONFIG_DIR_NAME).join("config.toml")
}
