//! Chat completion adapter: Implementation of ConversationalFallback.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint (Groq by
//! default). Every request is a fresh conversation: the two system prompts
//! followed by the user's text, verbatim.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::{ConversationalFallback, FallbackError};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const SCOPE_PROMPT: &str = "Answer these questions only if they are related to health, diseases, or any other health-related topics. Otherwise, reply saying 'I can't answer these questions. Sorry!'";

/// Configuration for the chat fallback.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API key; the fallback is disabled when `None`
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Completion model
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens in the completion
    pub max_completion_tokens: u32,

    /// Nucleus sampling
    pub top_p: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            max_completion_tokens: 1024,
            top_p: 1.0,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for the chat completion API.
pub struct GroqChat {
    config: ChatConfig,
    client: reqwest::blocking::Client,
}

impl GroqChat {
    /// Create a client.
    ///
    /// # Errors
    /// Returns `FallbackError::Request` if the HTTP client cannot be built.
    pub fn new(config: ChatConfig) -> Result<Self, FallbackError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FallbackError::Request(e.to_string()))?;

        if config.api_key.is_none() {
            tracing::warn!("No chat API key configured; unmatched symptoms will not get an answer");
        }

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "system",
                    content: SCOPE_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.config.temperature,
            max_completion_tokens: self.config.max_completion_tokens,
            top_p: self.config.top_p,
            stream: false,
        }
    }
}

impl ConversationalFallback for GroqChat {
    fn complete(&self, text: &str) -> Result<String, FallbackError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(FallbackError::Unavailable)?;

        tracing::debug!("Requesting chat completion from model {}", self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.build_request(text))
            .send()
            .map_err(|e| FallbackError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FallbackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| FallbackError::Request(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(FallbackError::EmptyResponse)
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unavailable() {
        let chat = GroqChat::new(ChatConfig::default()).expect("Should build client");
        assert!(!chat.is_available());
        assert!(matches!(
            chat.complete("what is a fever?"),
            Err(FallbackError::Unavailable)
        ));
    }

    #[test]
    fn test_request_body() {
        let chat = GroqChat::new(ChatConfig::default()).expect("Should build client");
        let body = serde_json::to_value(chat.build_request("I feel dizzy")).expect("Should serialize");

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["messages"][2]["role"], "user");
        assert_eq!(body["messages"][2]["content"], "I feel dizzy");
        assert_eq!(body["max_completion_tokens"], 1024);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let chat = GroqChat::new(ChatConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ChatConfig::default()
        })
        .expect("Should build client");
        assert_eq!(chat.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Drink water."}}]}"#,
        )
        .expect("Should parse");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Drink water.")
        );
    }
}
