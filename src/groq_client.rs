use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to LLM provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed LLM provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("LLM provider returned no completion")]
    EmptyCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

/// One turn of a prompt sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// A hosted chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the raw text of the first completion choice.
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for Groq's OpenAI-compatible chat completion API.
pub struct GroqClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
        let request_body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
        };

        debug!(model = %self.model, turns = messages.len(), "sending completion request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "completion request failed: {}", body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        debug!("received completion: {}", response_json);

        extract_content(response_json)
    }
}

fn extract_content(response_json: Value) -> Result<String, LlmError> {
    let parsed: CompletionResponse = serde_json::from_value(response_json)?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(LlmError::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn completions_url_handles_trailing_slash() {
        let client = GroqClient::with_base_url("k", "m", "http://localhost:9000/v1/");
        assert_eq!(client.completions_url(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn request_body_uses_lowercase_roles() {
        let messages = [PromptMessage::system("be nice"), PromptMessage::user("hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "qwen/qwen3-32b",
            messages: &messages,
            temperature: 0.0,
        })
        .unwrap();

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["model"], "qwen/qwen3-32b");
    }

    #[test]
    fn extracts_first_choice() {
        let content = extract_content(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        }))
        .unwrap();
        assert_eq!(content, "first");
    }

    #[test]
    fn missing_choices_is_an_error() {
        assert!(matches!(
            extract_content(json!({"choices": []})),
            Err(LlmError::EmptyCompletion)
        ));
        assert!(matches!(
            extract_content(json!({"error": "nope"})),
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[test]
    fn malformed_choice_is_a_decode_error() {
        let err = extract_content(json!({"choices": [{"message": 5}]})).unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
        assert!(err.to_string().starts_with("malformed LLM provider response"));
    }
}
