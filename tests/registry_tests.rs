use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use llmfactory::core::config::{CliOverrides, FactoryConfig, resolve_with_env};
use llmfactory::core::retry::{RetryPolicy, retry};
use llmfactory::inference::{
    Client, ClientParams, CompletionRequest, OllamaProvider, ProviderError, ProviderRegistry,
    get_completion,
};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// A constructor that builds an Ollama client from whatever base URL it is given.
fn ollama_constructor(params: &ClientParams) -> Result<Box<dyn Client>, ProviderError> {
    Ok(Box::new(OllamaProvider::from_params(params)?))
}

#[tokio::test]
async fn test_fake_provider_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"content": "hello"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut registry = ProviderRegistry::new();
    registry.register("fake", ollama_constructor);

    let params = ClientParams::new().base_url(mock_server.uri());
    let client = registry.create("fake", &params).unwrap();
    let answer = get_completion(client.as_ref(), CompletionRequest::new("m", "sys", "hi"))
        .await
        .unwrap();

    assert_eq!(answer, "hello");
}

#[test]
fn test_create_missing_is_not_registered() {
    let registry = ProviderRegistry::new();
    let err = registry.create("missing", &ClientParams::new()).err().unwrap();

    assert_eq!(err, ProviderError::NotRegistered("missing".to_string()));
    assert_eq!(err.to_string(), "client 'missing' not registered");
}

#[test]
fn test_reregistering_overrides_builtin() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut registry = ProviderRegistry::with_defaults();
    registry.register("openai", move |params: &ClientParams| {
        counter.fetch_add(1, Ordering::SeqCst);
        ollama_constructor(params)
    });

    // The replacement needs no API key, unlike the built-in.
    let client = registry.create("openai", &ClientParams::new()).unwrap();
    assert_eq!(client.name(), "ollama");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_config_params_flow_into_registry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "configured"}}]
        })))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let env = move |key: &str| match key {
        "LLMFACTORY_PROVIDER" => Some("openai".to_string()),
        "OPENAI_API_KEY" => Some("sk-env".to_string()),
        "OPENAI_API_BASE" => Some(uri.clone()),
        _ => None,
    };
    let resolved = resolve_with_env(&FactoryConfig::default(), &CliOverrides::default(), env);

    let registry = ProviderRegistry::with_defaults();
    let client = registry
        .create(&resolved.provider, &resolved.client_params(&resolved.provider))
        .unwrap();
    let request =
        CompletionRequest::new(&resolved.model_name, &resolved.system_prompt, "ping");
    let answer = get_completion(client.as_ref(), request).await.unwrap();

    assert_eq!(client.name(), "openai");
    assert_eq!(answer, "configured");
}

#[tokio::test]
async fn test_retry_wraps_completion_on_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = OllamaProvider::new(Some(mock_server.uri())).unwrap();
    let policy = RetryPolicy {
        max_attempts: 3,
        multiplier: std::time::Duration::ZERO,
        max_wait: std::time::Duration::ZERO,
    };
    let request = CompletionRequest::new("llama3", "", "hi");

    let err = retry(&policy, || get_completion(&client, request))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Api {
            status: 503,
            message: "loading model".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_config_base_url_fails_at_create() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config: FactoryConfig = toml::from_str(
        r#"
        [general]
        default_provider = "openai"

        [openai]
        api_key = "sk-file"
        base_url = "api.openai.com/v1"
        "#,
    )
    .unwrap();
    let resolved = resolve_with_env(&config, &CliOverrides::default(), |_| None);
    let params = resolved.client_params(&resolved.provider);

    let registry = ProviderRegistry::with_defaults();
    let err = registry.create(&resolved.provider, &params).err().unwrap();

    assert!(matches!(err, ProviderError::Config(ref msg) if msg.contains("base_url")));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_bare_ollama_host_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"content": "local"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let host = mock_server.address().to_string();
    let env = move |key: &str| match key {
        "LLMFACTORY_PROVIDER" => Some("ollama".to_string()),
        "OLLAMA_HOST" => Some(host.clone()),
        _ => None,
    };
    let resolved = resolve_with_env(&FactoryConfig::default(), &CliOverrides::default(), env);

    let registry = ProviderRegistry::with_defaults();
    let client = registry
        .create(&resolved.provider, &resolved.client_params(&resolved.provider))
        .unwrap();
    let answer = get_completion(client.as_ref(), CompletionRequest::new("llama3", "", "hi"))
        .await
        .unwrap();

    assert_eq!(answer, "local");
}
