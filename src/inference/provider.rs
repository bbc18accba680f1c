use std::fmt;

use async_trait::async_trait;

/// Errors that can occur while building or calling a provider client.
///
/// `Network`, `Api` and `Parse` are vendor call failures. They are passed back
/// to the caller exactly as the provider produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No constructor is registered under this name.
    NotRegistered(String),
    /// The client lacks the capability the caller asked for.
    UnsupportedClient(String),
    /// Constructor rejected its params (missing API key, bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response. Not retryable.
    Parse(String),
}

impl ProviderError {
    /// Whether a caller-side retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) => true,
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotRegistered(name) => write!(f, "client '{name}' not registered"),
            ProviderError::UnsupportedClient(name) => write!(f, "unsupported client: {name}"),
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to answer one prompt.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, system: &'a str, user: &'a str) -> Self {
        Self {
            model,
            system,
            user,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A constructed vendor client.
///
/// Capabilities are opt-in: a client advertises what it can do by returning
/// `Some(self)` from the matching accessor.
pub trait Client: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    fn as_chat(&self) -> Option<&dyn ChatCompletion> {
        None
    }

    fn as_embedder(&self) -> Option<&dyn Embedder> {
        None
    }
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends one system + user exchange and returns the answer text.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each input, returning one vector per input in input order.
    async fn embed(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}
