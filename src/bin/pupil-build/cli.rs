//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use pupil_build::core::host::{PlatformFamily, PythonVersion};
use pupil_build::ops::HostOverrides;

/// pupil-build - native build configuration for the pupil_detectors extensions
#[derive(Parser)]
#[command(name = "pupil-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the build plan and print it as JSON
    Plan(PlanArgs),

    /// Show compile/link flags for one extension module
    Flags(FlagsArgs),

    /// List the headers tracked for rebuilds
    Deps(DepsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Platform family to resolve libraries for.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    Windows,
    Posix,
}

impl From<PlatformArg> for PlatformFamily {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Windows => PlatformFamily::Windows,
            PlatformArg::Posix => PlatformFamily::Posix,
        }
    }
}

#[derive(Args, Clone)]
pub struct HostArgs {
    /// Directory containing the .pyx files and singleeyefitter/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Target Python version (MAJOR.MINOR); probed from the interpreter if unset
    #[arg(long, env = "PUPIL_BUILD_PYTHON_VERSION")]
    pub python_version: Option<PythonVersion>,

    /// numpy include directory; probed from the interpreter if unset
    #[arg(long)]
    pub numpy_include: Option<PathBuf>,

    /// Resolve libraries for this platform family instead of the host's
    #[arg(long, value_enum)]
    pub platform: Option<PlatformArg>,
}

impl HostArgs {
    pub fn overrides(&self) -> HostOverrides {
        HostOverrides {
            python_version: self.python_version,
            numpy_include: self.numpy_include.clone(),
            platform: self.platform.map(PlatformFamily::from),
        }
    }
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Extension module (detector_2d, detector_3d)
    pub module: String,

    #[command(flatten)]
    pub host: HostArgs,

    /// Show only compile flags
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show only link flags
    #[arg(long)]
    pub link: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Directory containing singleeyefitter/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Print only the fingerprint
    #[arg(long)]
    pub fingerprint: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
