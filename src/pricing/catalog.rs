use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{Filter, ProductRecord, SkippedEntry};
use crate::error::PricingError;

/// Wire shape of a single offer file. Pricing `terms` are not modelled.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    #[serde(default)]
    offer_code: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    publication_date: Option<String>,
    products: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    product_family: Option<String>,
    // Attribute names are catalog-defined and grow over time; keep them generic.
    #[serde(default)]
    attributes: Option<Map<String, Value>>,
}

/// A parsed offer file: catalog metadata plus every well-formed product.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    offer_code: Option<String>,
    version: Option<String>,
    publication_date: Option<String>,
    products: Vec<ProductRecord>,
    skipped: Vec<SkippedEntry>,
}

impl Catalog {
    /// eg. AmazonRDS
    pub fn offer_code(&self) -> Option<&str> {
        self.offer_code.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.publication_date.as_deref()
    }

    /// Products in no particular order.
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn into_products(self) -> Vec<ProductRecord> {
        self.products
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Drop every product `filter` rejects, keeping metadata and skipped entries.
    pub fn retain_matching(mut self, filter: &Filter) -> Self {
        self.products = filter.retain_matching(self.products);
        self
    }
}

/// Parse an offer file into normalised product records.
///
/// Fails only when the document is not JSON or lacks a `products` object.
/// Individual malformed products are recorded in [`Catalog::skipped`].
pub fn parse_catalog(text: &str, origin: &str) -> Result<Catalog, PricingError> {
    let raw: RawCatalog =
        serde_json::from_str(text).map_err(|err| PricingError::parse(origin, err))?;

    let mut products = Vec::with_capacity(raw.products.len());
    let mut skipped = Vec::new();

    for (key, value) in raw.products {
        match serde_json::from_value::<RawProduct>(value) {
            Ok(product) => {
                let mut attributes = BTreeMap::new();
                if let Some(nested) = product.attributes {
                    flatten_attributes(None, nested, &mut attributes);
                }
                products.push(ProductRecord::new(
                    product.sku.unwrap_or(key),
                    product.product_family.unwrap_or_default(),
                    attributes,
                ));
            }
            Err(err) => {
                warn!(%origin, sku = %key, error = %err, "skipping malformed product entry");
                skipped.push(SkippedEntry::new(key, err));
            }
        }
    }

    debug!(
        %origin,
        products = products.len(),
        skipped = skipped.len(),
        "parsed catalog"
    );

    Ok(Catalog {
        offer_code: raw.offer_code,
        version: raw.version,
        publication_date: raw.publication_date,
        products,
        skipped,
    })
}

/// Flatten an attribute object into `name -> value` strings.
///
/// Nested objects become `parent.child` keys, scalars and arrays keep their
/// JSON text, nulls are dropped. When a flattened name collides with a literal
/// dotted key, the one visited last (keys are walked in sorted order) wins and
/// the collision is logged.
fn flatten_attributes(prefix: Option<&str>, map: Map<String, Value>, out: &mut BTreeMap<String, String>) {
    for (key, value) in map {
        let name = match prefix {
            Some(parent) => format!("{parent}.{key}"),
            None => key,
        };

        match value {
            Value::Null => {}
            Value::String(s) => insert_attribute(out, name, s),
            Value::Object(nested) => flatten_attributes(Some(name.as_str()), nested, out),
            other => insert_attribute(out, name, other.to_string()),
        }
    }
}

fn insert_attribute(out: &mut BTreeMap<String, String>, name: String, value: String) {
    if let Some(previous) = out.get(&name) {
        warn!(attribute = %name, %previous, replacement = %value, "flattened attribute name collides");
    }
    out.insert(name, value);
}
