//! One calling convention over every registered vendor.
//!
//! The adapter never inspects concrete types. It asks the client for the
//! capability it needs and fails with `UnsupportedClient` when it is absent.

use log::{debug, info};

use super::{Client, CompletionRequest, ProviderError};

/// Returns the answer text for a system + user exchange.
///
/// Vendor call failures come back unchanged. No retries happen here; see
/// [`crate::core::retry`] for a caller-side policy.
pub async fn get_completion(
    client: &dyn Client,
    request: CompletionRequest<'_>,
) -> Result<String, ProviderError> {
    let chat = client
        .as_chat()
        .ok_or_else(|| ProviderError::UnsupportedClient(client.name().to_string()))?;

    info!(
        "Completion request: provider={}, model={}, system_len={}, user_len={}",
        client.name(),
        request.model,
        request.system.len(),
        request.user.len()
    );

    let answer = chat.complete(request).await?;
    debug!("Completion from {}: {} bytes", client.name(), answer.len());
    Ok(answer)
}

/// Embeds `inputs` with `model`, one vector per input.
pub async fn get_embeddings(
    client: &dyn Client,
    model: &str,
    inputs: &[String],
) -> Result<Vec<Vec<f32>>, ProviderError> {
    let embedder = client
        .as_embedder()
        .ok_or_else(|| ProviderError::UnsupportedClient(client.name().to_string()))?;

    info!(
        "Embedding request: provider={}, model={}, inputs={}",
        client.name(),
        model,
        inputs.len()
    );

    let vectors = embedder.embed(model, inputs).await?;
    if vectors.len() != inputs.len() {
        return Err(ProviderError::Parse(format!(
            "expected {} embeddings, got {}",
            inputs.len(),
            vectors.len()
        )));
    }
    Ok(vectors)
}
