use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

use super::SkippedEntry;
use crate::error::PricingError;
use crate::settings::Settings;

/// Wire shape of the top-level offer index. Offer names are not known in
/// advance, so `offers` stays a generic map until each entry is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOfferIndex {
    #[serde(default)]
    format_version: Option<String>,
    #[serde(default)]
    publication_date: Option<String>,
    offers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffer {
    current_version_url: String,
    #[serde(default)]
    version_index_url: Option<String>,
    #[serde(default)]
    current_region_index_url: Option<String>,
}

/// A product listed in the offer index and where its current catalog lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferIndexEntry {
    product_name: String,
    current_version_url: String,
    version_index_url: Option<String>,
    current_region_index_url: Option<String>,
}

impl OfferIndexEntry {
    pub fn new(product_name: impl Into<String>, current_version_url: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            current_version_url: current_version_url.into(),
            version_index_url: None,
            current_region_index_url: None,
        }
    }

    /// eg. AmazonRDS
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Relative path of the current catalog, eg.
    /// /offers/v1.0/aws/AmazonRDS/current/index.json
    pub fn current_version_url(&self) -> &str {
        &self.current_version_url
    }

    pub fn version_index_url(&self) -> Option<&str> {
        self.version_index_url.as_deref()
    }

    pub fn current_region_index_url(&self) -> Option<&str> {
        self.current_region_index_url.as_deref()
    }
}

/// Parsed offer index, entries ordered by product name.
#[derive(Debug, Clone, Default)]
pub struct OfferIndex {
    format_version: Option<String>,
    publication_date: Option<String>,
    entries: Vec<OfferIndexEntry>,
    skipped: Vec<SkippedEntry>,
}

impl OfferIndex {
    pub fn format_version(&self) -> Option<&str> {
        self.format_version.as_deref()
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.publication_date.as_deref()
    }

    pub fn entries(&self) -> &[OfferIndexEntry] {
        &self.entries
    }

    /// Entries that were malformed and left out of `entries`.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Exact, case-sensitive lookup by product name.
    pub fn lookup(&self, product_name: &str) -> Option<&OfferIndexEntry> {
        self.entries.iter().find(|e| e.product_name == product_name)
    }

    pub fn product_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.product_name.clone()).collect()
    }

    /// Fully qualified catalog URL of every entry.
    pub fn catalog_urls(&self, settings: &Settings) -> Result<Vec<Url>, PricingError> {
        self.entries
            .iter()
            .map(|e| settings.qualify(&e.current_version_url))
            .collect()
    }
}

/// Parse the offer index body. `origin` only labels errors and warnings.
///
/// A malformed entry is recorded and skipped; only a document that is not JSON
/// or has no `offers` object fails as a whole.
pub fn parse_offer_index(text: &str, origin: &str) -> Result<OfferIndex, PricingError> {
    let raw: RawOfferIndex =
        serde_json::from_str(text).map_err(|err| PricingError::parse(origin, err))?;

    let mut entries = Vec::with_capacity(raw.offers.len());
    let mut skipped = Vec::new();

    for (product_name, value) in raw.offers {
        match serde_json::from_value::<RawOffer>(value) {
            Ok(offer) => entries.push(OfferIndexEntry {
                product_name,
                current_version_url: offer.current_version_url,
                version_index_url: offer.version_index_url,
                current_region_index_url: offer.current_region_index_url,
            }),
            Err(err) => {
                warn!(%origin, product = %product_name, error = %err, "skipping malformed offer entry");
                skipped.push(SkippedEntry::new(product_name, err));
            }
        }
    }

    entries.sort_by(|a, b| a.product_name.cmp(&b.product_name));

    Ok(OfferIndex {
        format_version: raw.format_version,
        publication_date: raw.publication_date,
        entries,
        skipped,
    })
}
