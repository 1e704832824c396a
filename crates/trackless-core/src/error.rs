//! Error types for revision acceptance

use thiserror::Error;
use trackless_ooxml::OoxmlError;

/// Errors that abort acceptance of a single part
#[derive(Error, Debug)]
pub enum AcceptError {
    /// The table structure cannot be kept consistent after applying revisions
    #[error("Structural inconsistency at {location}: {reason}")]
    StructuralInconsistency {
        /// Breadcrumb to the offending node (e.g. `document/body/tbl[1]/tr[2]`)
        location: String,
        /// What went wrong
        reason: String,
    },

    /// Error from the package layer
    #[error(transparent)]
    Ooxml(#[from] OoxmlError),
}

impl AcceptError {
    pub(crate) fn structural(location: impl Into<String>, reason: impl Into<String>) -> Self {
        AcceptError::StructuralInconsistency {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for acceptance operations
pub type Result<T> = std::result::Result<T, AcceptError>;
