//! High-level operations.

pub mod configure;

pub use configure::{configure, scan_dependencies, ConfigureOptions, HostOverrides};
