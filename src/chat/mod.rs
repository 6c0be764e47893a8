// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat session management
//!
//! The glue between the terminal shell and the history core: command
//! parsing, prompt assembly and turn recording.

pub mod commands;
mod session;

pub use commands::{help_text, ChatCommand};
pub use session::{ChatSession, ChatSessionBuilder, MailReply, DEFAULT_CONTEXT_BUDGET};
