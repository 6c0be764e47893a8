// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenAI-compatible chat completions responder
//!
//! Talks to Groq by default; any endpoint that speaks the
//! `/chat/completions` dialect works with a different base URL.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{ApiError, ConvoError, Result};
use crate::llm::responder::{Responder, NO_RESPONSE};
use crate::llm::retry::{with_retry, RetryConfig};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Responder backed by a chat completions endpoint
pub struct ChatCompletionsResponder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    retry: RetryConfig,
}

impl ChatCompletionsResponder {
    /// Create a responder for the Groq endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GROQ_API_URL.to_string(),
            model: model.into(),
            system_prompt: None,
            temperature: None,
            retry: RetryConfig::default(),
        }
    }

    /// Build from settings; fails when no API key is available
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.api_key().ok_or_else(|| {
            ConvoError::Config(format!(
                "No API key found. Set {} or agent.api_key in {}",
                settings.agent.api_key_env,
                Settings::default_path().display()
            ))
        })?;

        let system_prompt = settings.agent.system_prompt();
        let mut responder = Self::new(api_key, settings.agent.model.clone())
            .with_base_url(settings.agent.base_url.clone())
            .with_retry_config(RetryConfig::from(&settings.resilience));
        if !system_prompt.is_empty() {
            responder = responder.with_system_prompt(system_prompt);
        }
        if let Some(temperature) = settings.agent.temperature {
            responder = responder.with_temperature(temperature);
        }
        Ok(responder)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = self.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
        }
    }

    /// Map a non-success response to an error
    fn parse_error(status: u16, retry_after: Option<u64>, body: &str) -> ConvoError {
        let (message, code) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.message, envelope.error.code.unwrap_or_default()),
            Err(_) => (body.to_string(), String::new()),
        };

        let api_error = match (status, code.as_str()) {
            (401 | 403, _) | (_, "invalid_api_key") => ApiError::AuthenticationFailed,
            (429, _) | (_, "rate_limit_exceeded") => {
                let seconds = retry_after.unwrap_or(60);
                ApiError::RateLimited(u32::try_from(seconds).unwrap_or(u32::MAX))
            }
            (_, "model_not_found") => ApiError::ModelNotFound(message),
            (404, _) if message.to_lowercase().contains("model") => {
                ApiError::ModelNotFound(message)
            }
            (408, _) => ApiError::Timeout,
            _ => ApiError::ServerError { status, message },
        };
        ConvoError::Api(api_error)
    }

    async fn send_once(&self, prompt: &str) -> Result<String> {
        let body = self.build_request(prompt);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry_after = parse_retry_after_seconds(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status, retry_after, &body));
        }

        let text = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ConvoError::Api(ApiError::InvalidResponse(e.to_string())))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty());

        match content {
            Some(content) => Ok(content),
            None => {
                tracing::warn!(model = %self.model, "endpoint returned no content");
                Ok(NO_RESPONSE.to_string())
            }
        }
    }
}

#[async_trait]
impl Responder for ChatCompletionsResponder {
    fn name(&self) -> &str {
        "groq"
    }

    async fn respond(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "sending prompt");
        with_retry(move || self.send_once(prompt), &self.retry, "chat completion").await
    }
}

/// Parse numeric Retry-After header (seconds).
fn parse_retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
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

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}
