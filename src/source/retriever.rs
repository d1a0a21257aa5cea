use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::PricingError;
use crate::settings::Settings;

/// The one retrieval primitive every component goes through.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// GET `url` once (no retry) and return the body decoded as UTF-8.
    async fn get_text(&self, url: &Url) -> Result<String, PricingError>;
}

/// reqwest-backed retriever. The timeout and user agent come from [`Settings`].
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    client: Client,
}

impl HttpRetriever {
    pub fn new(settings: &Settings) -> Result<Self, PricingError> {
        let client = Client::builder()
            .user_agent(settings.user_agent())
            .timeout(settings.timeout())
            .build()
            .map_err(|err| PricingError::retrieval(settings.base_url(), err))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn get_text(&self, url: &Url) -> Result<String, PricingError> {
        debug!(%url, "GET");

        let res = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| PricingError::retrieval(url.as_str(), err))?;

        let status = res.status();
        if !status.is_success() {
            return Err(PricingError::retrieval(url.as_str(), format!("HTTP {status}")));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|err| PricingError::retrieval(url.as_str(), format!("read body: {err}")))?;

        debug!(%url, bytes = bytes.len(), "received body");

        String::from_utf8(Vec::from(bytes)).map_err(|err| PricingError::parse(url.as_str(), err))
    }
}
