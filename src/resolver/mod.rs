//! Native library resolution.
//!
//! Finding OpenCV, Boost.Python, Ceres and Eigen works differently per
//! platform family. Each family implements [`PlatformResolver`]; one
//! resolver is picked per run with [`select_resolver`] and handed to the
//! configuration pipeline.
//!
//! - Windows: installation prefixes come from `VCPKG_PREFIX`, `CONDA_PREFIX`
//!   or a `PYTHONPATH` entry holding OpenCV binaries. Libraries are linked
//!   as files, carrying whatever ABI suffix the installed OpenCV uses.
//! - POSIX: a fixed OpenCV prefix, falling back to OpenCV 3 shipped with a
//!   ROS distribution. Libraries are linked by name.

pub mod errors;
pub mod posix;
pub mod windows;

pub use errors::ConfigureError;
pub use posix::{OpenCvInstall, PosixResolver};
pub use windows::WindowsResolver;

use crate::core::env::Environment;
use crate::core::host::{HostInfo, PlatformFamily};
use crate::core::library::{ResolvedLibraries, SearchPathSet};
use crate::util::config::Config;

/// Library lookup strategy for one platform family.
pub trait PlatformResolver {
    /// The platform family this resolver handles.
    fn family(&self) -> PlatformFamily;

    /// Header and library search directories for the third-party libraries.
    fn resolve_search_paths(&self, env: &Environment) -> Result<SearchPathSet, ConfigureError>;

    /// Concrete library names (and directly linked library files) to link
    /// against, given the directories found by [`resolve_search_paths`].
    ///
    /// [`resolve_search_paths`]: PlatformResolver::resolve_search_paths
    fn resolve_libraries(
        &self,
        env: &Environment,
        paths: &SearchPathSet,
    ) -> Result<ResolvedLibraries, ConfigureError>;

    /// Run both steps.
    fn resolve(&self, env: &Environment) -> Result<ResolvedLibraries, ConfigureError> {
        let paths = self.resolve_search_paths(env)?;
        let resolved = self.resolve_libraries(env, &paths)?;
        tracing::debug!(
            family = %self.family(),
            include_dirs = resolved.search_paths.include_dirs.len(),
            lib_dirs = resolved.search_paths.lib_dirs.len(),
            libraries = resolved.libraries.len(),
            extra_objects = resolved.extra_objects.len(),
            "resolved native libraries"
        );
        Ok(resolved)
    }
}

/// Pick the resolver for the host's platform family.
pub fn select_resolver(host: &HostInfo, config: &Config) -> Box<dyn PlatformResolver> {
    match host.family() {
        PlatformFamily::Windows => Box::new(WindowsResolver::new()),
        PlatformFamily::Posix => Box::new(PosixResolver::from_config(host, config)),
    }
}
