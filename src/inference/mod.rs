pub mod adapter;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod types;

pub use adapter::{get_completion, get_embeddings};
pub use provider::{ChatCompletion, Client, CompletionRequest, Embedder, ProviderError};
pub use providers::{AnthropicProvider, OllamaProvider, OpenAiProvider};
pub use registry::{Constructor, ProviderRegistry};
pub use types::ClientParams;
