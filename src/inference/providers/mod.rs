//! Vendor clients.
//!
//! Each vendor owns its wire types and its translation from
//! [`CompletionRequest`](crate::inference::CompletionRequest) to that wire
//! format. They share only the HTTP round trip below.

pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::inference::ProviderError;

pub const OPENAI: &str = "openai";
pub const ANTHROPIC: &str = "anthropic";
pub const OLLAMA: &str = "ollama";

/// Sends `body` as JSON and decodes a successful response as `R`.
///
/// Non-2xx responses become `ProviderError::Api` carrying the raw body.
pub(crate) async fn send_json<B, R>(
    vendor: &str,
    builder: reqwest::RequestBuilder,
    body: &B,
) -> Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let json_body = serde_json::to_string(body)
        .map_err(|e| ProviderError::Parse(format!("request serialization failed: {e}")))?;
    debug!("Raw {} request: {}", vendor, json_body);

    let response = builder
        .header("Content-Type", "application/json")
        .body(json_body)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    debug!("{} response status: {}", vendor, response.status());

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let err_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("{} API error: {} - {}", vendor, status, err_body);
        return Err(ProviderError::Api {
            status,
            message: err_body,
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;
    debug!("Raw {} response: {} bytes", vendor, text.len());

    serde_json::from_str(&text).map_err(|e| ProviderError::Parse(format!("{vendor} response: {e}")))
}
