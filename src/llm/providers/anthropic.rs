use super::{send_json, text_at, tokens_at, LlmProvider};
use crate::errors::GenerationError;
use crate::llm::{Generation, GenerationRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const PROVIDER: &str = "Anthropic";
const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const USAGE_POINTERS: [&str; 2] = ["/usage/input_tokens", "/usage/output_tokens"];

/// Anthropic requires an explicit output budget on every request.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Provider implementation for Anthropic's messages API
#[derive(Debug)]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a provider reading its key from `ANTHROPIC_API_KEY`
    pub fn new(model: &str) -> Result<Self, GenerationError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| GenerationError::MissingApiKey("ANTHROPIC_API_KEY"))?;
        Ok(Self {
            api_key,
            model: model.to_string(),
            client: Client::new(),
        })
    }

    /// System messages go to the top-level `system` field, joined in order;
    /// the rest of the conversation is sent unchanged.
    fn request_body(&self, request: &GenerationRequest) -> Value {
        let (system, conversation): (Vec<_>, Vec<_>) =
            request.messages.iter().partition(|m| m.role == "system");
        let system = system
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": conversation,
        });
        if !system.is_empty() {
            body["system"] = json!(system);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn call_llm_api(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        let body = self.request_body(&request);
        let http = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let response = send_json(PROVIDER, http).await?;
        let text = text_at(PROVIDER, &response, "/content/0/text")?;
        Ok(Generation::new(text).with_tokens(tokens_at(&response, &USAGE_POINTERS)))
    }
}
