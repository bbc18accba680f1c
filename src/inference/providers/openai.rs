//! OpenAI provider using the Chat Completions and Embeddings APIs.
//!
//! System text travels as a leading `system` message; the answer is
//! `choices[0].message.content`. Any OpenAI-compatible endpoint works if
//! `base_url` points at it.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{OPENAI, send_json};
use crate::inference::{
    ChatCompletion, Client, ClientParams, CompletionRequest, Embedder, ProviderError,
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// Chat Completions API Types
// ============================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Serialize, Debug)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Folds the system text into a leading message. Empty system text is dropped.
fn to_chat_request<'a>(request: &CompletionRequest<'a>) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !request.system.is_empty() {
        messages.push(ChatMessage {
            role: Role::System,
            content: request.system,
        });
    }
    messages.push(ChatMessage {
        role: Role::User,
        content: request.user,
    });

    ChatRequest {
        model: request.model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

fn from_chat_response(response: ChatResponse) -> Result<String, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("openai response contained no choices".to_string()))?;
    choice
        .message
        .content
        .ok_or_else(|| ProviderError::Parse("openai choice has no text content".to_string()))
}

fn from_embedding_response(response: EmbeddingResponse) -> Vec<Vec<f32>> {
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new OpenAI provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key
    /// * `base_url` - Optional custom base URL (defaults to OpenAI's API)
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, ProviderError> {
        Self::from_params(&ClientParams {
            api_key: Some(api_key),
            base_url,
            ..Default::default()
        })
    }

    /// Requires `api_key`; `base_url` is optional but must be a valid http(s) URL.
    pub fn from_params(params: &ClientParams) -> Result<Self, ProviderError> {
        let api_key = params.require_api_key(OPENAI)?.to_string();
        Ok(Self {
            api_key,
            base_url: params.require_base_url(OPENAI, DEFAULT_OPENAI_BASE_URL)?,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{}", self.base_url, endpoint))
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

impl Client for OpenAiProvider {
    fn name(&self) -> &str {
        OPENAI
    }

    fn as_chat(&self) -> Option<&dyn ChatCompletion> {
        Some(self)
    }

    fn as_embedder(&self) -> Option<&dyn Embedder> {
        Some(self)
    }
}

#[async_trait]
impl ChatCompletion for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let chat_request = to_chat_request(&request);
        info!(
            "OpenAI chat request: model={}, messages={}",
            request.model,
            chat_request.messages.len()
        );

        let response: ChatResponse =
            send_json(OPENAI, self.post("chat/completions"), &chat_request).await?;
        from_chat_response(response)
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let request = EmbeddingRequest { model, input: inputs };
        let response: EmbeddingResponse = send_json(OPENAI, self.post("embeddings"), &request).await?;
        Ok(from_embedding_response(response))
    }
}
