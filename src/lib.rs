//! Locate SKUs in a cloud vendor's pricing catalog by attribute filters.
//!
//! A catalog is selected by local path, URL, or product name (resolved through
//! the offer index), parsed into flat [`ProductRecord`]s and filtered with
//! case-insensitive wildcard patterns.

pub mod error;
pub mod helpers;
pub mod index;
pub mod logging;
pub mod pricing;
pub mod query;
pub mod settings;
pub mod source;

pub use error::PricingError;
pub use index::OfferIndexResolver;
pub use pricing::{Catalog, Filter, GlobPattern, OfferIndex, OfferIndexEntry, ProductRecord, SkippedEntry};
pub use query::{IndexDocument, IndexFormat, ProductQuery};
pub use settings::{Settings, SettingsError};
pub use source::{CatalogSource, HttpRetriever, Retriever, Selector};
