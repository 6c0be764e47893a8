// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Command handling for the chat shell
//!
//! Turns a raw input line into either a shell command or a prompt for the
//! agent. Commands are accepted bare (`history`) or slash-prefixed
//! (`/history`), case-insensitively.

/// What the user asked the shell to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Leave the chat loop
    Exit,
    /// Show the conversation so far
    History,
    /// Forget the in-memory conversation
    Clear,
    /// Show available commands
    Help,
    /// Blank line
    Empty,
    /// Anything else is sent to the agent
    Prompt(String),
}

impl ChatCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ChatCommand::Empty;
        }

        let word = trimmed.strip_prefix('/').unwrap_or(trimmed).to_lowercase();
        match word.as_str() {
            "quit" | "exit" => ChatCommand::Exit,
            "history" => ChatCommand::History,
            "clear" => ChatCommand::Clear,
            "help" => ChatCommand::Help,
            _ => ChatCommand::Prompt(trimmed.to_string()),
        }
    }
}

/// Help text listing shell commands
pub fn help_text() -> &'static str {
    "Commands:\n  \
     quit, /exit     leave the chat\n  \
     history         show this session's logged conversation\n  \
     clear           forget the conversation held in memory\n  \
     help            show this message\n\
     Anything else is sent to the agent."
}
