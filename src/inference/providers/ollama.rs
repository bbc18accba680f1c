//! Ollama provider for a local inference server.
//!
//! Uses the non-streaming `/api/chat` and `/api/embed` endpoints. No
//! authentication; construction only fails on a malformed base URL.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{OLLAMA, send_json};
use crate::inference::{
    ChatCompletion, Client, ClientParams, CompletionRequest, Embedder, ProviderError,
};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

// ============================================================================
// Ollama API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug, Default)]
struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl Options {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Options::is_empty")]
    options: Options,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: String,
}

#[derive(Serialize, Debug)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize, Debug)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn to_chat_request<'a>(request: &CompletionRequest<'a>) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !request.system.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: request.system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: request.user,
    });

    ChatRequest {
        model: request.model,
        messages,
        stream: false,
        options: Options {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        },
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>) -> Result<Self, ProviderError> {
        Self::from_params(&ClientParams {
            base_url,
            ..Default::default()
        })
    }

    /// Only `base_url` is read; everything else is ignored.
    pub fn from_params(params: &ClientParams) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: params.require_base_url(OLLAMA, DEFAULT_OLLAMA_BASE_URL)?,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Client for OllamaProvider {
    fn name(&self) -> &str {
        OLLAMA
    }

    fn as_chat(&self) -> Option<&dyn ChatCompletion> {
        Some(self)
    }

    fn as_embedder(&self) -> Option<&dyn Embedder> {
        Some(self)
    }
}

#[async_trait]
impl ChatCompletion for OllamaProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let chat_request = to_chat_request(&request);
        info!(
            "Ollama chat request: model={}, messages={}",
            request.model,
            chat_request.messages.len()
        );

        let builder = self.client.post(format!("{}/api/chat", self.base_url));
        let response: ChatResponse = send_json(OLLAMA, builder, &chat_request).await?;
        Ok(response.message.content)
    }
}

#[async_trait]
impl Embedder for OllamaProvider {
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let builder = self.client.post(format!("{}/api/embed", self.base_url));
        let request = EmbedRequest { model, input: inputs };
        let response: EmbedResponse = send_json(OLLAMA, builder, &request).await?;
        Ok(response.embeddings)
    }
}
