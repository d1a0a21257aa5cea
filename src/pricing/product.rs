use serde::Serialize;
use std::collections::BTreeMap;

/// One SKU of a catalog with its attributes flattened to plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductRecord {
    sku: String,
    #[serde(rename = "productFamily")]
    product_family: String,
    attributes: BTreeMap<String, String>,
}

impl ProductRecord {
    pub fn new(
        sku: impl Into<String>,
        product_family: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            product_family: product_family.into(),
            attributes,
        }
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// eg. "Database Instance"
    pub fn product_family(&self) -> &str {
        &self.product_family
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
