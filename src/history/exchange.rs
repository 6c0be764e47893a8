// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! A single recorded turn and its size estimate

use serde::{Deserialize, Serialize};

/// Characters per estimated token.
///
/// This is an approximation, not a tokenizer. Prompts built from history
/// have always been sized with it, so changing it shifts every context window.
pub const CHARS_PER_UNIT: usize = 4;

/// Estimate the size of `text` in context units: `floor(chars / 4)`.
///
/// Length is counted in Unicode scalar values, not bytes.
pub fn estimate_units(text: &str) -> usize {
    text.chars().count() / CHARS_PER_UNIT
}

/// One logical turn: what the user said and what the agent answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    user_input: String,
    agent_response: String,
}

impl Exchange {
    pub fn new(user_input: impl Into<String>, agent_response: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            agent_response: agent_response.into(),
        }
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn agent_response(&self) -> &str {
        &self.agent_response
    }

    /// Estimated size of both sides of the turn
    pub fn units(&self) -> usize {
        estimate_units(&self.user_input) + estimate_units(&self.agent_response)
    }

    /// Two-line prompt block: `User: ...` / `Agent: ...`
    pub fn render(&self) -> String {
        format!("User: {}\nAgent: {}", self.user_input, self.agent_response)
    }
}

impl<U: Into<String>, A: Into<String>> From<(U, A)> for Exchange {
    fn from((user_input, agent_response): (U, A)) -> Self {
        Self::new(user_input, agent_response)
    }
}
