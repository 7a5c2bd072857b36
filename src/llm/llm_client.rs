use crate::errors::GenerationError;
use crate::llm::providers::LlmProvider;
use crate::llm::{Generation, GenerationRequest};
use crate::utils::fit_conversation;
use tracing::debug;

/// Upper bound, in characters, of a conversation sent to a provider.
const MAX_CONVERSATION_CHARS: usize = 60_000;

/// Generic LLM client that delegates work to a concrete provider.
#[derive(Debug)]
pub struct LlmClient {
    provider: Box<dyn LlmProvider>,
}

impl LlmClient {
    /// Creates a new LLM client with the specified provider and model.
    ///
    /// # Arguments
    /// * `provider_name` - Name of the LLM provider ("openai", "anthropic", or "ollama")
    /// * `model` - Model name to use with the provider
    pub fn new(provider_name: &str, model: &str) -> Result<Self, GenerationError> {
        let provider: Box<dyn LlmProvider> = match provider_name {
            "openai" => Box::new(crate::llm::providers::openai::OpenAiProvider::new(model)?),
            "anthropic" => Box::new(crate::llm::providers::anthropic::AnthropicProvider::new(
                model,
            )?),
            "ollama" => Box::new(crate::llm::providers::ollama::OllamaProvider::new(model)?),
            _ => return Err(GenerationError::UnknownProvider(provider_name.to_string())),
        };

        Ok(LlmClient { provider })
    }

    /// Wraps an already constructed provider.
    pub fn from_provider(provider: Box<dyn LlmProvider>) -> Self {
        LlmClient { provider }
    }

    /// Submits one request and returns the raw generated text with its token usage.
    ///
    /// No retry happens here; a failing provider surfaces as `GenerationError`.
    pub async fn generate(
        &self,
        mut request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        if fit_conversation(&mut request.messages, MAX_CONVERSATION_CHARS) {
            debug!("Conversation trimmed to {} chars", MAX_CONVERSATION_CHARS);
        }
        debug!("messages: {:?}", request.messages);
        let response = self.provider.call_llm_api(request).await?;
        debug!("LLM response ({} tokens): {}", response.total_tokens, response.text);
        Ok(response)
    }
}
