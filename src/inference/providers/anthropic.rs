//! Anthropic provider using the native Messages API.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{ANTHROPIC, send_json};
use crate::inference::{ChatCompletion, Client, ClientParams, CompletionRequest, ProviderError};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
/// The Messages API rejects requests without `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

// ============================================================================
// Messages API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// System text goes in the dedicated `system` field, not the message list.
fn to_messages_request<'a>(request: &CompletionRequest<'a>) -> MessagesRequest<'a> {
    MessagesRequest {
        model: request.model,
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: (!request.system.is_empty()).then_some(request.system),
        messages: vec![Message {
            role: "user",
            content: request.user,
        }],
        temperature: request.temperature,
    }
}

/// Joins the `text` blocks; tool-use and other block types are skipped.
fn from_messages_response(response: MessagesResponse) -> Result<String, ProviderError> {
    let mut texts = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .map(|block| block.text)
        .peekable();

    if texts.peek().is_none() {
        return Err(ProviderError::Parse(
            "anthropic response contained no text blocks".to_string(),
        ));
    }
    Ok(texts.collect::<Vec<_>>().join(""))
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, ProviderError> {
        Self::from_params(&ClientParams {
            api_key: Some(api_key),
            base_url,
            ..Default::default()
        })
    }

    pub fn from_params(params: &ClientParams) -> Result<Self, ProviderError> {
        let api_key = params.require_api_key(ANTHROPIC)?.to_string();
        Ok(Self {
            api_key,
            base_url: params.require_base_url(ANTHROPIC, DEFAULT_ANTHROPIC_BASE_URL)?,
            client: reqwest::Client::new(),
        })
    }
}

impl Client for AnthropicProvider {
    fn name(&self) -> &str {
        ANTHROPIC
    }

    fn as_chat(&self) -> Option<&dyn ChatCompletion> {
        Some(self)
    }
}

#[async_trait]
impl ChatCompletion for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let messages_request = to_messages_request(&request);
        info!(
            "Anthropic messages request: model={}, max_tokens={}, has_system={}",
            request.model,
            messages_request.max_tokens,
            messages_request.system.is_some()
        );

        let builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);

        let response: MessagesResponse = send_json(ANTHROPIC, builder, &messages_request).await?;
        from_messages_response(response)
    }
}
