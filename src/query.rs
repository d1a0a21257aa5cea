use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::PricingError;
use crate::index::OfferIndexResolver;
use crate::pricing::{Catalog, Filter, ProductRecord, parse_catalog};
use crate::settings::Settings;
use crate::source::{CatalogSource, HttpRetriever, Retriever, Selector};

/// Shape requested from [`ProductQuery::fetch_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Structured,
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexDocument {
    Structured(Value),
    Raw(String),
}

/// Entry point wiring retrieval, parsing and filtering together.
///
/// Holds no mutable state: every call rebuilds its own index lookup and parsed
/// catalog, so one instance can serve concurrent queries.
#[derive(Clone)]
pub struct ProductQuery {
    retriever: Arc<dyn Retriever>,
    settings: Settings,
}

impl ProductQuery {
    /// Query over HTTP using `settings` for the endpoint and timeout.
    pub fn new(settings: Settings) -> Result<Self, PricingError> {
        let retriever = HttpRetriever::new(&settings)?;
        Ok(Self::with_retriever(Arc::new(retriever), settings))
    }

    pub fn with_retriever(retriever: Arc<dyn Retriever>, settings: Settings) -> Self {
        Self { retriever, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn index_resolver(&self) -> OfferIndexResolver<'_> {
        OfferIndexResolver::new(self.retriever.as_ref(), &self.settings)
    }

    /// Product names found in the offer index.
    pub async fn list_services(&self) -> Result<Vec<String>, PricingError> {
        Ok(self.index_resolver().fetch_index().await?.product_names())
    }

    /// Fully qualified URL of every product's current catalog.
    pub async fn list_catalog_urls(&self) -> Result<Vec<String>, PricingError> {
        let index = self.index_resolver().fetch_index().await?;
        let urls = index.catalog_urls(&self.settings)?;
        Ok(urls.into_iter().map(String::from).collect())
    }

    pub async fn fetch_index(&self, format: IndexFormat) -> Result<IndexDocument, PricingError> {
        let resolver = self.index_resolver();
        let text = resolver.fetch_index_text().await?;

        match format {
            IndexFormat::Raw => Ok(IndexDocument::Raw(text)),
            IndexFormat::Structured => {
                let origin = self.settings.index_url()?;
                serde_json::from_str(&text)
                    .map(IndexDocument::Structured)
                    .map_err(|err| PricingError::parse(origin.as_str(), err))
            }
        }
    }

    /// Resolve and parse a catalog, then keep only the records `filter` accepts.
    ///
    /// The returned catalog still carries its metadata and skipped entries.
    pub async fn query_catalog(&self, selector: &Selector, filter: &Filter) -> Result<Catalog, PricingError> {
        let document = CatalogSource::new(self.retriever.as_ref(), &self.settings)
            .resolve(selector)
            .await?;

        let catalog = parse_catalog(document.text(), document.origin())?;
        let total = catalog.products().len();
        let catalog = catalog.retain_matching(filter);

        info!(
            %selector,
            total,
            matched = catalog.products().len(),
            skipped = catalog.skipped().len(),
            "filtered catalog"
        );
        Ok(catalog)
    }

    /// Records of the selected catalog that match `filter`. No match is an
    /// empty result, not an error.
    pub async fn query_products(
        &self,
        selector: &Selector,
        filter: &Filter,
    ) -> Result<Vec<ProductRecord>, PricingError> {
        Ok(self.query_catalog(selector, filter).await?.into_products())
    }
}
