mod catalog;
mod filter;
mod offer_index;
mod product;

pub use catalog::{Catalog, parse_catalog};
pub use filter::{Filter, GlobPattern};
pub use offer_index::{OfferIndex, OfferIndexEntry, parse_offer_index};
pub use product::ProductRecord;

use serde::Serialize;

/// A malformed index or catalog entry that was skipped rather than aborting
/// the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    key: String,
    reason: String,
}

impl SkippedEntry {
    pub(crate) fn new(key: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Map key of the offending entry (product name or SKU).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
