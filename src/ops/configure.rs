//! The configuration pipeline: scan headers, resolve libraries, assemble
//! descriptors.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::extension::{build_descriptors, ExtensionInputs};
use crate::builder::plan::{BuildPlan, CythonizeOptions, PackageMetadata};
use crate::builder::scan::{DependencyManifest, HeaderScanner};
use crate::core::env::Environment;
use crate::core::host::{HostInfo, HostOs, InterpreterInfo, PlatformFamily, PythonVersion};
use crate::resolver::select_resolver;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};
use crate::util::fs::absolute_path;
use crate::util::process::find_python;

/// Header tree scanned for rebuild dependencies, relative to the source root.
pub const HEADER_ROOT: &str = "singleeyefitter";

/// Headers shared with the other native components of the repository.
pub const SHARED_CPP_INCLUDE: &str = "../../shared_cpp/include";

/// Everything a configuration run depends on.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Directory containing the `.pyx` files and `singleeyefitter/`
    pub source_root: PathBuf,
    pub host: HostInfo,
    pub env: Environment,
    pub config: Config,
    /// numpy's include directory, if known
    pub numpy_include: Option<PathBuf>,
}

/// Overrides for host detection.
#[derive(Debug, Clone, Default)]
pub struct HostOverrides {
    pub python_version: Option<PythonVersion>,
    pub numpy_include: Option<PathBuf>,
    pub platform: Option<PlatformFamily>,
}

impl ConfigureOptions {
    /// Gather options from the real host: OS, interpreter, process
    /// environment and config files.
    pub fn detect(source_root: &Path, overrides: HostOverrides) -> Result<Self> {
        let source_root = absolute_path(source_root);
        let os = host_os(overrides.platform);

        let (python, numpy_include) = match overrides.python_version {
            Some(version) => {
                let numpy = overrides
                    .numpy_include
                    .or_else(|| find_python().and_then(|py| InterpreterInfo::probe_numpy(&py)));
                (version, numpy)
            }
            None => {
                let info = InterpreterInfo::probe().context("failed to detect python version")?;
                (info.version, overrides.numpy_include.or(info.numpy_include))
            }
        };

        let config = load_config(
            global_config_path().as_deref(),
            &project_config_path(&source_root),
        );

        tracing::debug!("host: {} / python {}", os, python);

        Ok(ConfigureOptions {
            source_root,
            host: HostInfo::new(os, python),
            env: Environment::from_process(),
            config,
            numpy_include,
        })
    }
}

/// The OS to resolve for, honoring a platform family override.
fn host_os(platform: Option<PlatformFamily>) -> HostOs {
    let current = HostOs::current();
    match platform {
        None => current,
        Some(family) if family == current.family() => current,
        Some(PlatformFamily::Windows) => HostOs::Windows,
        Some(PlatformFamily::Posix) => HostOs::Linux,
    }
}

/// Scan the header tree, paths relative to the source root.
pub fn scan_dependencies(source_root: &Path, config: &Config) -> Result<DependencyManifest> {
    let scanner = HeaderScanner::new(config.header_suffixes());
    let manifest = scanner.scan(&source_root.join(HEADER_ROOT))?;
    Ok(manifest.relative_to(source_root))
}

/// Project include directories, in search order.
pub fn base_include_dirs(numpy_include: Option<&Path>) -> Vec<PathBuf> {
    [PathBuf::from(SHARED_CPP_INCLUDE), PathBuf::from(HEADER_ROOT)]
        .into_iter()
        .chain(numpy_include.map(Path::to_path_buf))
        .collect()
}

/// Compute the build plan.
///
/// Fails without producing anything if the header tree is unreadable or the
/// native libraries cannot be located.
pub fn configure(opts: &ConfigureOptions) -> Result<BuildPlan> {
    let source_root = &opts.source_root;
    tracing::info!("Configuring {}", source_root.display());

    let depends = scan_dependencies(source_root, &opts.config)?;
    let dependency_fingerprint = depends.fingerprint(source_root)?;
    tracing::debug!(
        "{} headers, fingerprint {}",
        depends.len(),
        &dependency_fingerprint[..16]
    );

    let resolver = select_resolver(&opts.host, &opts.config);
    let libraries = resolver.resolve(&opts.env)?;

    let base_includes = base_include_dirs(opts.numpy_include.as_deref());
    let extensions = build_descriptors(ExtensionInputs {
        base_include_dirs: &base_includes,
        libraries: &libraries,
        depends: &depends,
    });

    Ok(BuildPlan {
        package: PackageMetadata::default(),
        source_root: source_root.clone(),
        host: opts.host.clone(),
        platform: resolver.family(),
        cythonize: CythonizeOptions {
            quiet: opts.config.cython_quiet(),
            nthreads: opts.config.cython_nthreads(),
        },
        extensions,
        dependency_fingerprint,
    })
}
