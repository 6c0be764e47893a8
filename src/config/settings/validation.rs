// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{ConvoError, Result};

use super::Settings;

impl Settings {
    /// Get the API key, checking the configured env var first.
    pub fn api_key(&self) -> Option<String> {
        // Priority: env var > config file.
        std::env::var(&self.agent.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.agent.api_key.clone())
    }

    /// Reject values that would make the agent or the retry loop misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.agent.model.trim().is_empty() {
            return Err(ConvoError::Config("agent.model must not be empty".into()));
        }
        if self.agent.base_url.trim().is_empty() {
            return Err(ConvoError::Config("agent.base_url must not be empty".into()));
        }
        if let Some(temperature) = self.agent.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConvoError::Config(format!(
                    "agent.temperature must be between 0.0 and 2.0, got {}",
                    temperature
                )));
            }
        }
        if self.history.max_context_tokens < 0 {
            return Err(ConvoError::Config(format!(
                "history.max_context_tokens must not be negative, got {}",
                self.history.max_context_tokens
            )));
        }
        if !(0.0..=1.0).contains(&self.resilience.jitter) {
            return Err(ConvoError::Config(format!(
                "resilience.jitter must be between 0.0 and 1.0, got {}",
                self.resilience.jitter
            )));
        }
        if self.resilience.base_delay_ms > self.resilience.max_delay_ms {
            return Err(ConvoError::Config(
                "resilience.base_delay_ms must not exceed resilience.max_delay_ms".into(),
            ));
        }
        Ok(())
    }
}
