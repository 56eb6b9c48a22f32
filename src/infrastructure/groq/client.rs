//! HTTP client for the chat-completions backend.
//!
//! One client serves both model roles: deterministic single-shot
//! classification and streamed generation at the responder temperature.
//! There are no retries; a failed call is terminal for its request.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as ReqwestClient;

use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::models::LlmConfig;
use crate::domain::ports::{LanguageModel, TokenStream};
use crate::infrastructure::groq::streaming::SseDataStream;
use crate::infrastructure::groq::types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
};

/// Client for an OpenAI-compatible chat-completions API.
pub struct GroqClient {
    http: ReqwestClient,
    config: LlmConfig,
}

impl GroqClient {
    /// Create a new client.
    ///
    /// Fails when no API key is configured; the service must not come up
    /// with a backend it cannot call.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            bail!("LLM API key is missing. Set llm.api_key or the GROQ_API_KEY environment variable.");
        }

        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    fn build_request(
        &self,
        instruction: &str,
        message: &str,
        temperature: f32,
        stream: bool,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(instruction),
                ChatMessage::user(message),
            ],
            temperature,
            stream,
        }
    }

    async fn send(&self, request: &ChatCompletionRequest) -> ChatResult<reqwest::Response> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(ChatError::Generation(format!(
                "chat completions returned {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn classify(&self, instruction: &str, message: &str) -> ChatResult<String> {
        let request = self.build_request(
            instruction,
            message,
            self.config.classifier_temperature,
            false,
        );

        let response = self.send(&request).await?;
        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Generation("chat completion had no content".to_string()))
    }

    async fn stream_reply(&self, instruction: &str, message: &str) -> ChatResult<TokenStream> {
        let request = self.build_request(
            instruction,
            message,
            self.config.responder_temperature,
            true,
        );

        let response = self.send(&request).await?;
        let events = SseDataStream::new(response.bytes_stream());

        let tokens = events.filter_map(|event| async move {
            match event {
                Ok(payload) => match serde_json::from_str::<ChatCompletionChunk>(&payload) {
                    Ok(chunk) => chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .filter(|text| !text.is_empty())
                        .map(Ok),
                    Err(err) => Some(Err(ChatError::Generation(format!(
                        "malformed stream payload: {err}"
                    )))),
                },
                Err(err) => Some(Err(err)),
            }
        });

        Ok(Box::pin(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GroqClient {
        GroqClient::new(LlmConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        assert!(GroqClient::new(LlmConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_classify_returns_reply_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({ "stream": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "knowledge" } }]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .classify("classify this", "placements?")
            .await
            .unwrap();
        assert_eq!(reply, "knowledge");
    }

    #[tokio::test]
    async fn test_classify_uses_classifier_temperature() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "temperature": 0.0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "general" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).classify("i", "m").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_becomes_generation_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .classify("i", "m")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Generation(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).classify("i", "m").await.unwrap_err();
        assert!(matches!(err, ChatError::Generation(_)));
    }

    #[tokio::test]
    async fn test_stream_reply_yields_delta_tokens() {
        let server = MockServer::start().await;

        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{}}]}\n\n",
            "data: [DONE]\n\n",
        );

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "stream": true })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let mut stream = client_for(&server)
            .stream_reply("instruction", "message")
            .await
            .unwrap();

        let mut tokens = Vec::new();
        while let Some(item) = stream.next().await {
            tokens.push(item.unwrap());
        }
        assert_eq!(tokens, vec!["Hello", " world"]);
    }

    #[tokio::test]
    async fn test_stream_reply_propagates_malformed_payload() {
        let server = MockServer::start().await;

        let body = "data: not json\n\ndata: [DONE]\n\n";
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let mut stream = client_for(&server)
            .stream_reply("instruction", "message")
            .await
            .unwrap();

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(ChatError::Generation(_))));
    }
}
