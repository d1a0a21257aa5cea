mod retriever;

pub use retriever::{HttpRetriever, Retriever};

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::error::PricingError;
use crate::index::OfferIndexResolver;
use crate::pricing::{OfferIndex, OfferIndexEntry};
use crate::settings::Settings;

/// Where a catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A pre-downloaded catalog on the local filesystem.
    Path(PathBuf),
    /// A catalog URL fetched as is.
    Url(String),
    /// A product name looked up in the offer index, eg. AmazonRDS.
    ProductName(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Path(path) => write!(f, "path {}", path.display()),
            Selector::Url(url) => write!(f, "url {url}"),
            Selector::ProductName(name) => write!(f, "product {name}"),
        }
    }
}

/// Raw catalog text plus a label of where it was read from.
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    origin: String,
    text: String,
}

impl CatalogDocument {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Turns a [`Selector`] into catalog text.
pub struct CatalogSource<'a> {
    retriever: &'a dyn Retriever,
    settings: &'a Settings,
}

impl<'a> CatalogSource<'a> {
    pub fn new(retriever: &'a dyn Retriever, settings: &'a Settings) -> Self {
        Self { retriever, settings }
    }

    pub async fn resolve(&self, selector: &Selector) -> Result<CatalogDocument, PricingError> {
        match selector {
            Selector::Path(path) => read_local(path).await,
            Selector::Url(raw) => {
                let url = Url::parse(raw).map_err(|err| PricingError::retrieval(raw.as_str(), err))?;
                self.fetch(url).await
            }
            Selector::ProductName(name) => {
                let index = OfferIndexResolver::new(self.retriever, self.settings)
                    .fetch_index()
                    .await?;
                let entry = validate_product(&index, name)?;
                let url = self.settings.qualify(entry.current_version_url())?;
                self.fetch(url).await
            }
        }
    }

    async fn fetch(&self, url: Url) -> Result<CatalogDocument, PricingError> {
        let text = self.retriever.get_text(&url).await?;
        Ok(CatalogDocument {
            origin: url.into(),
            text,
        })
    }
}

/// Membership check done before any catalog request is issued.
pub fn validate_product<'i>(
    index: &'i OfferIndex,
    product_name: &str,
) -> Result<&'i OfferIndexEntry, PricingError> {
    index
        .lookup(product_name)
        .ok_or_else(|| PricingError::UnknownProduct(product_name.to_string()))
}

async fn read_local(path: &Path) -> Result<CatalogDocument, PricingError> {
    let location = path.display().to_string();

    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|err| PricingError::retrieval(location.as_str(), err))?;
    if !exists {
        return Err(PricingError::NotFound(path.to_path_buf()));
    }

    debug!(path = %location, "reading local catalog");

    let bytes = tokio::fs::read(path).await.map_err(|err| match err.kind() {
        ErrorKind::NotFound => PricingError::NotFound(path.to_path_buf()),
        _ => PricingError::retrieval(location.as_str(), err),
    })?;

    let text = String::from_utf8(bytes).map_err(|err| PricingError::parse(location.as_str(), err))?;

    Ok(CatalogDocument {
        origin: location,
        text,
    })
}
