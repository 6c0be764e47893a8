// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! convo - a chat agent that remembers the conversation.
//!
//! This crate exposes the runtime used by the `convo` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `history`: the in-memory conversation record, its estimated-token
//!   context window, and the logs it is persisted to
//! - `chat`: session wiring, prompt assembly and shell commands
//! - `llm`: the responder abstraction and the chat-completions client
//! - `mail`: answering email through a pluggable transport
//! - `config`, `cli`, `error`: ambient plumbing

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod mail;

pub use error::{ConvoError, Result};
