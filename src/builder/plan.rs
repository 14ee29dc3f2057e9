//! Build plan generation.
//!
//! A BuildPlan is the complete hand-off to the external build driver: the
//! package metadata, cythonize options, and the two extension descriptors.
//! Nothing in it is decided later.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::extension::{DetectorModule, PACKAGE_NAME};
use crate::core::extension::ExtensionDescriptor;
use crate::core::host::{HostInfo, PlatformFamily};

/// Distribution metadata passed to `setup()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub url: String,
    pub author: String,
    pub author_email: String,
    pub license: String,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        PackageMetadata {
            name: PACKAGE_NAME.to_string(),
            version: "0.1".to_string(),
            url: "https://github.com/pupil-labs/pupil".to_string(),
            author: "Pupil Labs".to_string(),
            author_email: "info@pupil-labs.com".to_string(),
            license: "GNU".to_string(),
        }
    }
}

/// Options forwarded to `cythonize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CythonizeOptions {
    pub quiet: bool,
    pub nthreads: usize,
}

/// A complete build plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub package: PackageMetadata,

    /// Directory all relative source and header paths are relative to
    pub source_root: PathBuf,

    /// Host the plan was computed for
    pub host: HostInfo,

    pub platform: PlatformFamily,

    pub cythonize: CythonizeOptions,

    /// 2D detector first, then 3D
    pub extensions: [ExtensionDescriptor; 2],

    /// Content hash of every header in `depends`
    pub dependency_fingerprint: String,
}

impl BuildPlan {
    /// Look up the descriptor for one module.
    pub fn extension(&self, module: DetectorModule) -> &ExtensionDescriptor {
        match module {
            DetectorModule::Detector2d => &self.extensions[0],
            DetectorModule::Detector3d => &self.extensions[1],
        }
    }

    /// Serialize the plan as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize build plan")
    }
}
