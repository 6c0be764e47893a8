// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// convo - chat with an LLM that remembers the conversation
#[derive(Parser, Debug)]
#[command(name = "convo")]
#[command(version, about = "Chat with an LLM that remembers the conversation")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Conversation database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Session whose history is loaded and appended to
    #[arg(short, long, global = true)]
    pub session: Option<String>,

    /// Keep history in memory only
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive chat session (default when no command given)
    Chat(ChatArgs),

    /// Ask a single question (non-interactive); the exchange is recorded
    Ask(AskArgs),

    /// Show the recorded conversation
    History(HistoryArgs),
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Initial prompt (optional)
    pub prompt: Option<String>,

    /// Estimated-token budget for history in each prompt
    #[arg(long, allow_negative_numbers = true)]
    pub budget: Option<i64>,

    /// Exchanges kept in memory before the oldest is evicted
    #[arg(long)]
    pub max_history: Option<usize>,
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub prompt: String,

    /// Estimated-token budget for history in the prompt
    #[arg(long, allow_negative_numbers = true)]
    pub budget: Option<i64>,
}

/// Arguments for the history subcommand
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of exchanges to show (newest)
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
