//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::inference::{ChatCompletion, Client, CompletionRequest, Embedder, ProviderError};

/// A chat client that answers every prompt with a canned reply and records
/// the (model, system, user) triples it was asked.
pub struct StubChatClient {
    name: String,
    reply: Result<String, ProviderError>,
    requests: Mutex<Vec<(String, String, String)>>,
}

impl StubChatClient {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, error: ProviderError) -> Self {
        Self {
            name: name.to_string(),
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Client for StubChatClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_chat(&self) -> Option<&dyn ChatCompletion> {
        Some(self)
    }
}

#[async_trait]
impl ChatCompletion for StubChatClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push((
            request.model.to_string(),
            request.system.to_string(),
            request.user.to_string(),
        ));
        self.reply.clone()
    }
}

/// A client handle with no capabilities at all.
pub struct StubHandle {
    name: String,
}

impl StubHandle {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Client for StubHandle {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An embedding-only client returning fixed vectors.
pub struct StubEmbedder {
    name: String,
    vectors: Vec<Vec<f32>>,
}

impl StubEmbedder {
    pub fn new(name: &str, vectors: Vec<Vec<f32>>) -> Self {
        Self {
            name: name.to_string(),
            vectors,
        }
    }
}

impl Client for StubEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_embedder(&self) -> Option<&dyn Embedder> {
        Some(self)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _model: &str, _inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(self.vectors.clone())
    }
}
