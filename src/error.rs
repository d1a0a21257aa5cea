use std::path::PathBuf;

/// Failures surfaced by the retrieval-and-match pipeline.
///
/// Callers get the precise original cause: nothing is wrapped or translated
/// on the way up from the component that failed.
#[derive(thiserror::Error, Debug)]
pub enum PricingError {
    /// Transport failure, non-success HTTP status, or an unreadable local file.
    #[error("failed to retrieve {location}: {reason}")]
    Retrieval { location: String, reason: String },
    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unknown product '{0}' (not present in the offer index)")]
    UnknownProduct(String),
    /// The whole document is malformed or lacks its expected top-level collection.
    #[error("malformed document from {origin}: {reason}")]
    Parse { origin: String, reason: String },
    #[error("invalid filter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl PricingError {
    pub(crate) fn retrieval(location: impl Into<String>, reason: impl ToString) -> Self {
        PricingError::Retrieval {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(origin: impl Into<String>, reason: impl ToString) -> Self {
        PricingError::Parse {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}
