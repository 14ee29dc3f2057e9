//! Build plan assembly.
//!
//! Scans header dependencies and turns resolved libraries into extension
//! descriptors.

pub mod extension;
pub mod plan;
pub mod scan;

pub use extension::{build_descriptors, DetectorModule, ExtensionInputs};
pub use plan::{BuildPlan, CythonizeOptions, PackageMetadata};
pub use scan::{scan_headers, DependencyManifest, HeaderScanner, ScanError};
