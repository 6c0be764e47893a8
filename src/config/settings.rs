// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for convo
//!
//! Handles loading and saving settings from ~/.convo/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod io;
mod validation;

/// Main settings structure, stored in ~/.convo/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Chat-completions endpoint and assistant persona
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation memory settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Retry and resilience settings for API calls
    #[serde(default)]
    pub resilience: ResilienceConfig,
}

/// Configuration for the LLM endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model id sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible chat completions URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name the assistant introduces itself with
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Persona description; `{name}` is replaced by `assistant_name`
    #[serde(default = "default_description")]
    pub description: String,

    /// Extra instructions appended to the system message
    #[serde(default)]
    pub instructions: Vec<String>,

    /// Sampling temperature (endpoint default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            assistant_name: default_assistant_name(),
            description: default_description(),
            instructions: Vec::new(),
            temperature: None,
        }
    }
}

impl AgentConfig {
    /// System message built from the description and instructions
    pub fn system_prompt(&self) -> String {
        let mut prompt = self.description.replace("{name}", &self.assistant_name);
        for instruction in &self.instructions {
            if !prompt.is_empty() {
                prompt.push('\n');
            }
            prompt.push_str("- ");
            prompt.push_str(instruction);
        }
        prompt
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Estimated token budget for history included in each prompt
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: i64,

    /// Exchanges kept in memory; older ones are evicted. Unbounded by
    /// default so the token budget alone decides what reaches the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history_length: Option<usize>,

    /// SQLite database file (defaults to ~/.convo/conversation_database.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Session the log is scoped to
    #[serde(default = "default_session_id")]
    pub session_id: String,

    /// Persist exchanges to the database
    #[serde(default = "default_true")]
    pub persist: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            max_history_length: None,
            database: None,
            session_id: default_session_id(),
            persist: true,
        }
    }
}

/// Retry and resilience configuration for API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (cap for backoff)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Jitter percentage (0.0 to 1.0) for randomizing delays
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_assistant_name() -> String {
    "Convo".to_string()
}

fn default_description() -> String {
    "You are {name}, a helpful assistant that always responds in a polite, upbeat and \
     positive manner. You are assisting the user with their queries."
        .to_string()
}

fn default_max_context_tokens() -> i64 {
    5000
}

fn default_session_id() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    5000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_jitter() -> f64 {
    0.25
}
