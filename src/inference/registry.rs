//! # Provider Registry
//!
//! Maps a provider name to a constructor and builds clients on demand.
//! The registry is a plain value owned by the caller; there is no
//! process-wide table.

use std::collections::HashMap;

use log::{debug, info};

use super::providers::{ANTHROPIC, AnthropicProvider, OLLAMA, OllamaProvider, OPENAI, OpenAiProvider};
use super::{Client, ClientParams, ProviderError};

/// Builds a client from construction params.
pub type Constructor =
    Box<dyn Fn(&ClientParams) -> Result<Box<dyn Client>, ProviderError> + Send + Sync>;

/// Registry of provider constructors, keyed by name.
#[derive(Default)]
pub struct ProviderRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `openai`, `anthropic` and `ollama` constructors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(OPENAI, |params: &ClientParams| {
            Ok(Box::new(OpenAiProvider::from_params(params)?) as Box<dyn Client>)
        });
        registry.register(ANTHROPIC, |params: &ClientParams| {
            Ok(Box::new(AnthropicProvider::from_params(params)?) as Box<dyn Client>)
        });
        registry.register(OLLAMA, |params: &ClientParams| {
            Ok(Box::new(OllamaProvider::from_params(params)?) as Box<dyn Client>)
        });
        info!("Registered default providers: {:?}", registry.names());
        registry
    }

    /// Register a constructor. Replaces any constructor already under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&ClientParams) -> Result<Box<dyn Client>, ProviderError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.constructors.insert(name.clone(), Box::new(constructor)).is_some() {
            debug!("Replaced constructor for provider '{}'", name);
        } else {
            debug!("Registered constructor for provider '{}'", name);
        }
    }

    /// Build a client for `name`. Constructor errors are returned as-is.
    pub fn create(&self, name: &str, params: &ClientParams) -> Result<Box<dyn Client>, ProviderError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ProviderError::NotRegistered(name.to_string()))?;
        debug!(
            "Creating client '{}' (api_key set: {}, base_url: {:?})",
            name,
            params.api_key.is_some(),
            params.base_url
        );
        constructor(params)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::test_support::{StubChatClient, StubHandle};

    #[test]
    fn test_create_invokes_constructor_once_with_params() {
        let seen: Arc<Mutex<Vec<ClientParams>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let mut registry = ProviderRegistry::new();
        registry.register("fake", move |params: &ClientParams| {
            recorder.lock().unwrap().push(params.clone());
            Ok(Box::new(StubChatClient::new("fake", "hello")) as Box<dyn Client>)
        });

        let params = ClientParams::new().api_key("sk-1").base_url("http://example");
        let client = registry.create("fake", &params).unwrap();

        assert_eq!(client.name(), "fake");
        let calls = seen.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], params);
    }

    #[test]
    fn test_missing_name_never_invokes_constructor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = ProviderRegistry::new();
        registry.register("present", move |_: &ClientParams| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubHandle::new("present")) as Box<dyn Client>)
        });

        let err = registry.create("missing", &ClientParams::new()).err();
        assert_eq!(err, Some(ProviderError::NotRegistered("missing".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ProviderRegistry::new();
        registry.register("dup", |_: &ClientParams| {
            Ok(Box::new(StubHandle::new("first")) as Box<dyn Client>)
        });
        registry.register("dup", |_: &ClientParams| {
            Ok(Box::new(StubHandle::new("second")) as Box<dyn Client>)
        });

        assert_eq!(registry.len(), 1);
        for _ in 0..3 {
            let client = registry.create("dup", &ClientParams::new()).unwrap();
            assert_eq!(client.name(), "second");
        }
    }

    #[test]
    fn test_constructor_error_propagates_unchanged() {
        let mut registry = ProviderRegistry::new();
        registry.register("strict", |_: &ClientParams| {
            Err(ProviderError::Config("invalid credentials".to_string()))
        });

        let err = registry.create("strict", &ClientParams::new()).err();
        assert_eq!(err, Some(ProviderError::Config("invalid credentials".to_string())));
    }

    #[test]
    fn test_defaults_registered() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["anthropic", "ollama", "openai"]);
        assert!(registry.contains("ollama"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_default_constructors_check_credentials() {
        let registry = ProviderRegistry::with_defaults();

        assert!(matches!(
            registry.create("openai", &ClientParams::new()),
            Err(ProviderError::Config(_))
        ));
        assert!(matches!(
            registry.create("anthropic", &ClientParams::new()),
            Err(ProviderError::Config(_))
        ));

        let ollama = registry.create("ollama", &ClientParams::new()).unwrap();
        assert_eq!(ollama.name(), "ollama");

        let openai = registry
            .create("openai", &ClientParams::new().api_key("sk-1234567890abcdef"))
            .unwrap();
        assert_eq!(openai.name(), "openai");
        assert!(openai.as_chat().is_some());
        assert!(openai.as_embedder().is_some());
    }

    #[test]
    fn test_default_constructors_reject_malformed_base_url() {
        let registry = ProviderRegistry::with_defaults();

        let err = registry
            .create("openai", &ClientParams::new().api_key("sk").base_url("not a url"))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::Config(_)));
        assert!(!err.is_retryable());

        assert!(matches!(
            registry.create("ollama", &ClientParams::new().base_url("localhost:11434")),
            Err(ProviderError::Config(_))
        ));
    }
}
