//! Configuration error types and diagnostics.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Fatal error while resolving native libraries.
///
/// Every variant records what was searched, so the failure can be acted on
/// instead of surfacing later as an obscure link error.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ConfigureError {
    #[error("could not find library directory")]
    #[diagnostic(
        code(pupil_build::resolve::no_library_dir),
        help("Set environment variable VCPKG_PREFIX or use conda")
    )]
    NoLibraryDirectory { searched: Vec<String> },

    #[error("cannot read library directory `{}`", .path.display())]
    #[diagnostic(code(pupil_build::resolve::unreadable_library_dir))]
    UnreadableLibraryDirectory {
        path: PathBuf,
        /// The installation prefix the directory was derived from
        prefix: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigureError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigureError::NoLibraryDirectory { searched } => {
                let mut diag = Diagnostic::error(self.to_string());
                for place in searched {
                    diag = diag.with_context(format!("searched {}", place));
                }
                diag.with_suggestion(suggestions::SET_VCPKG_PREFIX)
                    .with_suggestion(suggestions::USE_CONDA)
            }

            ConfigureError::UnreadableLibraryDirectory {
                path,
                prefix,
                source,
            } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(format!("derived from prefix {}", prefix.display()))
                .with_context(source.to_string())
                .with_suggestion(suggestions::CHECK_PREFIX_LAYOUT),
        }
    }
}
