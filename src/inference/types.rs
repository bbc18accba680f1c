use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Construction parameters handed to a provider constructor.
///
/// Constructors receive these by reference and decide for themselves which
/// fields are required. Anything vendor-specific goes in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ClientParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the API key, or a `Config` error naming the provider that needs one.
    pub fn require_api_key(&self, provider: &str) -> Result<&str, super::ProviderError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(super::ProviderError::Config(format!(
                "missing api_key for {provider}"
            ))),
        }
    }

    /// Returns the base URL (or `default`) with any trailing slash removed.
    ///
    /// The URL must parse and use `http` or `https`; anything else is a
    /// `Config` error, so a bad URL is caught at construction time.
    pub fn require_base_url(
        &self,
        provider: &str,
        default: &str,
    ) -> Result<String, super::ProviderError> {
        let raw = self.base_url.as_deref().unwrap_or(default).trim();
        let url = reqwest::Url::parse(raw).map_err(|e| {
            super::ProviderError::Config(format!("invalid base_url for {provider} '{raw}': {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(super::ProviderError::Config(format!(
                "invalid base_url for {provider} '{raw}': scheme must be http or https"
            )));
        }
        Ok(raw.trim_end_matches('/').to_string())
    }
}
