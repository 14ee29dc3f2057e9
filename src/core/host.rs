//! Host platform and interpreter identification.
//!
//! The platform family is decided once per configuration run and never
//! changes afterwards; everything downstream receives a [`HostInfo`] value.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::process::{find_python, ProcessBuilder};

/// Operating system reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    Other(String),
}

impl HostOs {
    /// Detect the OS this binary is running on.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Classify an OS name (`std::env::consts::OS` style).
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            "macos" | "darwin" => HostOs::MacOs,
            other => HostOs::Other(other.to_string()),
        }
    }

    /// The platform family used to select a library resolver.
    pub fn family(&self) -> PlatformFamily {
        match self {
            HostOs::Windows => PlatformFamily::Windows,
            _ => PlatformFamily::Posix,
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Windows => write!(f, "windows"),
            HostOs::Linux => write!(f, "linux"),
            HostOs::MacOs => write!(f, "macos"),
            HostOs::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Platform family: the only distinction the library resolver cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Windows,
    Posix,
}

impl PlatformFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFamily::Windows => "windows",
            PlatformFamily::Posix => "posix",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Python interpreter version (major.minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        PythonVersion { major, minor }
    }
}

impl FromStr for PythonVersion {
    type Err = anyhow::Error;

    /// Parse `3.6`, `3.6.9` or `3.11.2+` style strings. Only major and minor are kept.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.');
        let major = parts.next().unwrap_or_default();
        let Some(minor) = parts.next() else {
            bail!("invalid python version `{}` (expected MAJOR.MINOR)", s.trim());
        };

        let major = major
            .parse()
            .with_context(|| format!("invalid python major version in `{}`", s.trim()))?;
        let minor: String = minor.chars().take_while(|c| c.is_ascii_digit()).collect();
        let minor = minor
            .parse()
            .with_context(|| format!("invalid python minor version in `{}`", s.trim()))?;

        Ok(PythonVersion { major, minor })
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What the configuration run knows about the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub os: HostOs,
    pub python: PythonVersion,
}

impl HostInfo {
    pub fn new(os: HostOs, python: PythonVersion) -> Self {
        HostInfo { os, python }
    }

    pub fn family(&self) -> PlatformFamily {
        self.os.family()
    }
}

/// Facts reported by the host Python interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterInfo {
    pub version: PythonVersion,
    /// Include directory of the installed numpy, if numpy is importable.
    pub numpy_include: Option<PathBuf>,
}

const PROBE_VERSION: &str = "import sys; print('%d.%d' % sys.version_info[:2])";
const PROBE_NUMPY: &str = "import numpy; print(numpy.get_include())";

impl InterpreterInfo {
    /// Ask the interpreter on PATH for its version and numpy include directory.
    pub fn probe() -> Result<Self> {
        let Some(python) = find_python() else {
            bail!(
                "no python interpreter found on PATH\n\
                 help: pass --python-version, or set PUPIL_BUILD_PYTHON_VERSION"
            );
        };
        tracing::debug!("probing interpreter {}", python.display());

        let output = ProcessBuilder::new(&python)
            .args(["-c", PROBE_VERSION])
            .exec_and_check()?;
        let version: PythonVersion = String::from_utf8_lossy(&output.stdout).parse()?;

        Ok(InterpreterInfo {
            version,
            numpy_include: Self::probe_numpy(&python),
        })
    }

    /// Locate numpy's include directory with the given interpreter.
    ///
    /// A missing numpy is not fatal here; the compiler will complain loudly
    /// enough if the headers are actually needed.
    pub fn probe_numpy(python: &std::path::Path) -> Option<PathBuf> {
        match ProcessBuilder::new(python)
            .args(["-c", PROBE_NUMPY])
            .exec_and_check()
        {
            Ok(output) => {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                (!path.is_empty()).then(|| PathBuf::from(path))
            }
            Err(e) => {
                tracing::warn!("numpy include directory not found: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_family() {
        assert_eq!(HostOs::from_name("windows").family(), PlatformFamily::Windows);
        assert_eq!(HostOs::from_name("linux").family(), PlatformFamily::Posix);
        assert_eq!(HostOs::from_name("Darwin"), HostOs::MacOs);
        assert_eq!(
            HostOs::from_name("freebsd"),
            HostOs::Other("freebsd".to_string())
        );
        assert_eq!(HostOs::from_name("freebsd").family(), PlatformFamily::Posix);
    }

    #[test]
    fn test_parse_python_version() {
        assert_eq!("3.6".parse::<PythonVersion>().unwrap(), PythonVersion::new(3, 6));
        assert_eq!(
            "3.11.2\n".parse::<PythonVersion>().unwrap(),
            PythonVersion::new(3, 11)
        );
        assert_eq!(
            "3.12rc1".parse::<PythonVersion>().unwrap(),
            PythonVersion::new(3, 12)
        );
        assert!("3".parse::<PythonVersion>().is_err());
        assert!("three.six".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_python_version_display() {
        assert_eq!(PythonVersion::new(2, 7).to_string(), "2.7");
    }
}
