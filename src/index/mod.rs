use tracing::{debug, info};

use crate::error::PricingError;
use crate::pricing::{OfferIndex, parse_offer_index};
use crate::settings::Settings;
use crate::source::Retriever;

/// Fetches the top-level offer index: one retrieval per call.
pub struct OfferIndexResolver<'a> {
    retriever: &'a dyn Retriever,
    settings: &'a Settings,
}

impl<'a> OfferIndexResolver<'a> {
    pub fn new(retriever: &'a dyn Retriever, settings: &'a Settings) -> Self {
        Self { retriever, settings }
    }

    /// The index body exactly as served.
    pub async fn fetch_index_text(&self) -> Result<String, PricingError> {
        let url = self.settings.index_url()?;
        debug!(%url, "fetching offer index");
        self.retriever.get_text(&url).await
    }

    pub async fn fetch_index(&self) -> Result<OfferIndex, PricingError> {
        let url = self.settings.index_url()?;
        debug!(%url, "fetching offer index");
        let text = self.retriever.get_text(&url).await?;

        let index = parse_offer_index(&text, url.as_str())?;
        info!(
            offers = index.entries().len(),
            skipped = index.skipped().len(),
            "resolved offer index"
        );
        Ok(index)
    }
}
