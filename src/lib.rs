//! pupil-build - native extension build configuration for pupil_detectors
//!
//! Computes, for the host platform, everything needed to compile the two
//! Cython detector modules: header dependencies, library search paths and
//! names, and the per-module extension descriptors. Compilation itself is
//! left to the build driver consuming the [`BuildPlan`].

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Filesystem fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildPlan, DependencyManifest, DetectorModule};
pub use core::{Environment, ExtensionDescriptor, HostInfo, PlatformFamily};
pub use ops::{configure, ConfigureOptions};
pub use resolver::{select_resolver, ConfigureError, PlatformResolver};
