mod models;

use std::{fs, path::Path};

use url::Url;

use crate::error::PricingError;

pub use models::{
    DEFAULT_BASE_URL, DEFAULT_INDEX_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Settings,
};

// ---- Loaders (serde hidden from callers) ----

impl Settings {
    /// Load settings from a JSON file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data = fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_json_str(&data)
    }

    /// Load settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let parsed: Settings = serde_json::from_str(json).map_err(SettingsError::Json)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Load settings from an env var containing JSON.
    pub fn from_env(var: &str) -> Result<Self, SettingsError> {
        let s = std::env::var(var).map_err(|_| SettingsError::MissingEnv(var.to_string()))?;
        Self::from_json_str(&s)
    }

    /// Checked after every override: a zero timeout would fail every request.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.timeout_secs == 0 {
            return Err(SettingsError::InvalidTimeout(self.timeout_secs));
        }
        Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|err| SettingsError::InvalidBaseUrl(format!("{}: {err}", self.base_url)))
    }

    /// Fully qualified address of the offer index.
    pub fn index_url(&self) -> Result<Url, PricingError> {
        self.qualify(&self.index_path)
    }

    /// Qualify a path taken from the offer index against the base endpoint.
    ///
    /// Absolute URLs are returned untouched; relative paths are appended to the
    /// base with exactly one `/` between them so a base carrying its own path
    /// prefix keeps it.
    pub fn qualify(&self, relative: &str) -> Result<Url, PricingError> {
        if let Ok(absolute) = Url::parse(relative) {
            return Ok(absolute);
        }

        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| PricingError::retrieval(joined.clone(), err))
    }
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid timeout: {0}s (must be at least 1s)")]
    InvalidTimeout(u64),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
