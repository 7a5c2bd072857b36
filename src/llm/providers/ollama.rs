use super::{send_json, text_at, tokens_at, LlmProvider};
use crate::errors::GenerationError;
use crate::llm::{Generation, GenerationRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

const PROVIDER: &str = "Ollama";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Prompt and completion token counts of a chat response
const USAGE_POINTERS: [&str; 2] = ["/prompt_eval_count", "/eval_count"];

/// Provider implementation for a local Ollama server
#[derive(Debug)]
pub struct OllamaProvider {
    /// Model identifier to use (e.g. "llama3", "codellama")
    model: String,
    /// `OLLAMA_URL` or the local default, without trailing slash
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(model: &str) -> Result<Self, GenerationError> {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    /// Non-streaming chat request; sampling settings travel in `options`.
    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut options = Map::new();
        if let Some(temperature) = request.temperature {
            options.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            options.insert("num_predict".to_string(), json!(max_tokens));
        }
        json!({
            "model": self.model,
            "stream": false,
            "messages": request.messages,
            "options": options,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn call_llm_api(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        let body = self.request_body(&request);
        let http = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body);
        let response = send_json(PROVIDER, http).await?;
        let text = text_at(PROVIDER, &response, "/message/content")?;
        Ok(Generation::new(text).with_tokens(tokens_at(&response, &USAGE_POINTERS)))
    }
}
