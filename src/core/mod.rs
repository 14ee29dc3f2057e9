//! Core data types: host identity, environment, libraries, descriptors.

pub mod env;
pub mod extension;
pub mod host;
pub mod library;

pub use env::Environment;
pub use extension::{ExtensionDescriptor, Language};
pub use host::{HostInfo, HostOs, InterpreterInfo, PlatformFamily, PythonVersion};
pub use library::{LibrarySpec, ResolvedLibraries, SearchPathSet};
