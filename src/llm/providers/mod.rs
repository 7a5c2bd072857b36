use crate::errors::GenerationError;
use crate::llm::{Generation, GenerationRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod anthropic;
pub mod ollama;
pub mod openai;

/// A backend able to turn a conversation into generated text.
#[async_trait]
pub trait LlmProvider: Debug + Send + Sync {
    async fn call_llm_api(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError>;
}

/// Sends a prepared request and returns the JSON body of a 2xx response.
///
/// Any other status becomes [`GenerationError::Api`] carrying the raw body.
pub(crate) async fn send_json(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Value, GenerationError> {
    let res = request.send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(GenerationError::Api {
            provider,
            status: status.as_u16(),
            body: res.text().await?,
        });
    }
    Ok(res.json().await?)
}

/// Trimmed text found at `pointer` in a provider response
pub(crate) fn text_at(
    provider: &'static str,
    response: &Value,
    pointer: &str,
) -> Result<String, GenerationError> {
    response
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(GenerationError::EmptyResponse(provider))
}

/// Sum of the token counts found at `pointers`; missing counts are zero.
pub(crate) fn tokens_at(response: &Value, pointers: &[&str]) -> u64 {
    pointers
        .iter()
        .filter_map(|pointer| response.pointer(pointer).and_then(Value::as_u64))
        .sum()
}
