// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! convo - chat with an LLM that remembers the conversation
//!
//! Entry point for the convo CLI application.

use std::sync::Arc;

use clap::Parser;

use convo::chat::{ChatSession, ChatSessionBuilder};
use convo::cli::{ChatArgs, Cli, Commands};
use convo::config::Settings;
use convo::error::Result;
use convo::history::{ConversationLog, MemoryConversationLog, SqliteConversationLog};
use convo::llm::ChatCompletionsResponder;

#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_ask, run_chat_loop, run_history_command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on convo's own debug output; `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        if let Ok(parsed) = "convo=debug".parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Load settings, then let flags override them
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(db) = &cli.db {
        settings.history.database = Some(db.clone());
    }
    if let Some(session) = &cli.session {
        settings.history.session_id = session.clone();
    }
    if cli.no_persist {
        settings.history.persist = false;
    }
    settings.validate()?;

    match cli.command {
        None => run_chat(ChatArgs::default(), settings).await?,
        Some(Commands::Chat(args)) => run_chat(args, settings).await?,
        Some(Commands::Ask(args)) => {
            let mut session = build_session(&settings, args.budget, None)?;
            run_ask(&mut session, &args.prompt).await?;
        }
        Some(Commands::History(args)) => {
            run_history_command(&settings, args.limit, &cli.format)?;
        }
    }

    Ok(())
}

/// Run interactive chat mode
async fn run_chat(args: ChatArgs, settings: Settings) -> Result<()> {
    let mut session = build_session(&settings, args.budget, args.max_history)?;
    run_chat_loop(&mut session, &settings, args.prompt).await
}

/// Wire the responder and conversation log described by `settings`
fn build_session(
    settings: &Settings,
    budget: Option<i64>,
    max_history: Option<usize>,
) -> Result<ChatSession> {
    let responder = ChatCompletionsResponder::from_settings(settings)?;
    tracing::debug!(model = responder.model(), "responder configured");

    let log: Box<dyn ConversationLog> = if settings.history.persist {
        let path = settings.database_path();
        tracing::debug!(path = %path.display(), session = %settings.history.session_id, "opening conversation log");
        Box::new(SqliteConversationLog::open(
            &path,
            settings.history.session_id.clone(),
        )?)
    } else {
        Box::new(MemoryConversationLog::new())
    };

    let mut builder = ChatSessionBuilder::from_settings(settings)
        .with_responder(Arc::new(responder))
        .with_log(log);
    if let Some(budget) = budget {
        builder = builder.with_context_budget(budget);
    }
    if let Some(max_len) = max_history {
        builder = builder.with_max_history_length(Some(max_len));
    }
    builder.build()
}
