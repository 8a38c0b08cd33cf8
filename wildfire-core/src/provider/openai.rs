//! Chat Completions client for the advisory endpoint.
//!
//! One system message and one user message per call; no history, no
//! streaming, no retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    advisory::AdvisoryPrompt,
    error::{Result, WildfireError},
    provider::ProviderId,
};

use super::{LanguageModelProvider, truncate_body};

const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    http: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>, model: String, http: Client) -> Self {
        Self {
            api_key,
            model,
            base_url: OPENAI_BASE_URL.to_string(),
            http,
        }
    }

    /// Point the adapter at a different host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

fn upstream_error(message: String) -> WildfireError {
    WildfireError::upstream(ProviderId::OpenAi, message)
}

#[async_trait]
impl LanguageModelProvider for OpenAiProvider {
    async fn complete(&self, prompt: &AdvisoryPrompt) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(WildfireError::Configuration {
            provider: ProviderId::OpenAi,
        })?;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let res = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream_error(format!("failed to send request: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| upstream_error(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!(%status, model = %self.model, "chat completion failed");
            return Err(WildfireError::upstream_status(
                ProviderId::OpenAi,
                status.as_u16(),
                format!("status {status}: {}", truncate_body(&text)),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| upstream_error(format!("failed to parse chat completion JSON: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| upstream_error("chat completion contained no message".into()))?;

        debug!(model = %self.model, chars = content.len(), "received advisory");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, api_key: Option<&str>) -> OpenAiProvider {
        OpenAiProvider::new(api_key.map(str::to_owned), "gpt-3.5-turbo".into(), Client::new())
            .with_base_url(server.uri())
    }

    fn prompt() -> AdvisoryPrompt {
        AdvisoryPrompt::new("User question: is it windy?".into())
    }

    #[tokio::test]
    async fn sends_system_and_user_messages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": crate::advisory::SYSTEM_PROMPT},
                    {"role": "user", "content": "User question: is it windy?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Avoid open flames today."}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server, Some("sk-test"))
            .complete(&prompt())
            .await
            .unwrap();
        assert_eq!(reply, "Avoid open flames today.");
    }

    #[tokio::test]
    async fn missing_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider(&server, None)
            .complete(&prompt())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WildfireError::Configuration {
                provider: ProviderId::OpenAi
            }
        ));
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server, Some("sk-bad"))
            .complete(&prompt())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WildfireError::Upstream {
                provider: ProviderId::OpenAi,
                status: Some(401),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_choices_is_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = provider(&server, Some("sk-test"))
            .complete(&prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, WildfireError::Upstream { status: None, .. }));
    }
}
