//! Note summarization through an OpenAI-compatible chat completion
//! API.

use std::fmt;
use std::time::Duration;

use notekeeper_core::error::{NotekeeperError, NotekeeperResult};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a helpful assistant who summarizes note content, \
                             providing only the essential information.";

/// Produces a short summary of a note's content.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, content: &str) -> impl Future<Output = NotekeeperResult<String>> + Send;
}

#[derive(Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    /// Base URL up to and including the API version, e.g.
    /// `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o".into(),
            timeout_secs: 60,
        }
    }
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, content: &'a str) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content,
            },
        ],
        temperature: 0.0,
    }
}

fn extract_summary(response: ChatCompletionResponse) -> NotekeeperResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| NotekeeperError::Summarization("model returned no content".into()))
}

/// [`Summarizer`] backed by `POST {base_url}/chat/completions`.
pub struct ChatCompletionSummarizer {
    client: HttpClient,
    config: SummarizerConfig,
}

impl ChatCompletionSummarizer {
    pub fn new(config: SummarizerConfig) -> NotekeeperResult<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotekeeperError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl Summarizer for ChatCompletionSummarizer {
    async fn summarize(&self, content: &str) -> NotekeeperResult<String> {
        let request = build_request(&self.config.model, content);

        debug!(model = %self.config.model, chars = content.len(), "Requesting summary");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotekeeperError::Summarization(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotekeeperError::Summarization(format!(
                "API returned {status}: {body}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| NotekeeperError::Summarization(format!("parse error: {e}")))?;

        extract_summary(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_system_prompt_and_zero_temperature() {
        let request = build_request("gpt-4o", "Buy milk and eggs tomorrow");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Buy milk and eggs tomorrow");
    }

    #[test]
    fn summary_is_taken_from_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Buy groceries. "}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_summary(response).unwrap(), "Buy groceries.");
    }

    #[test]
    fn empty_response_is_an_error() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
        ] {
            let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
            assert!(matches!(
                extract_summary(response),
                Err(NotekeeperError::Summarization(_))
            ));
        }
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let summarizer = ChatCompletionSummarizer::new(SummarizerConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            summarizer.endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let config = SummarizerConfig {
            api_key: "sk-very-secret".into(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
