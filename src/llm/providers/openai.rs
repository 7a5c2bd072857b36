use super::{send_json, text_at, tokens_at, LlmProvider};
use crate::errors::GenerationError;
use crate::llm::{Generation, GenerationRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const PROVIDER: &str = "OpenAI";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Provider implementation for OpenAI's chat completions API
#[derive(Debug)]
pub struct OpenAiProvider {
    api_key: String,
    /// Model identifier to use (e.g. "gpt-4", "gpt-4o-mini")
    model: String,
    client: Client,
}

impl OpenAiProvider {
    /// Creates a provider reading its key from `OPENAI_API_KEY`
    pub fn new(model: &str) -> Result<Self, GenerationError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| GenerationError::MissingApiKey("OPENAI_API_KEY"))?;
        Ok(Self {
            api_key,
            model: model.to_string(),
            client: Client::new(),
        })
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn call_llm_api(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        let body = self.request_body(&request);
        let http = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body);
        let response = send_json(PROVIDER, http).await?;
        let text = text_at(PROVIDER, &response, "/choices/0/message/content")?;
        Ok(Generation::new(text).with_tokens(tokens_at(&response, &["/usage/total_tokens"])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[test]
    fn sampling_settings_are_sent_only_when_set() {
        let provider = OpenAiProvider {
            api_key: "k".to_string(),
            model: "gpt-4".to_string(),
            client: Client::new(),
        };
        let bare = provider.request_body(&GenerationRequest::new(vec![ChatMessage::user("hi")]));
        assert!(bare.get("temperature").is_none());
        assert_eq!(bare["messages"][0]["role"], "user");

        let tuned = provider.request_body(
            &GenerationRequest::new(vec![ChatMessage::user("hi")])
                .with_temperature(0.3)
                .with_max_tokens(2000),
        );
        assert_eq!(tuned["max_tokens"], 2000);
        assert!(tuned["temperature"].as_f64().is_some());
    }
}
