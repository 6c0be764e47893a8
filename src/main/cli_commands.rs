// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use convo::chat::{help_text, ChatCommand, ChatSession};
use convo::cli::OutputFormat;
use convo::config::Settings;
use convo::error::Result;
use convo::history::SqliteConversationLog;

/// Interactive loop: read a line, dispatch it, repeat until exit or EOF
pub(super) async fn run_chat_loop(
    session: &mut ChatSession,
    settings: &Settings,
    initial_prompt: Option<String>,
) -> Result<()> {
    let name = settings.agent.assistant_name.as_str();
    print_welcome(name, session)?;

    if let Some(prompt) = initial_prompt {
        answer(session, name, &prompt).await?;
    }

    loop {
        let Some(line) = read_user_input()? else {
            println!();
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Exit => {
                println!("\nGoodbye!");
                break;
            }
            ChatCommand::Empty => continue,
            ChatCommand::Help => println!("\n{}\n", help_text()),
            ChatCommand::History => print_history(session)?,
            ChatCommand::Clear => {
                session.reset();
                println!("\nConversation cleared.\n");
            }
            ChatCommand::Prompt(prompt) => answer(session, name, &prompt).await?,
        }
    }

    Ok(())
}

/// Single non-interactive turn
pub(super) async fn run_ask(session: &mut ChatSession, prompt: &str) -> Result<()> {
    let response = session.turn(prompt).await?;
    println!("{}", response);
    Ok(())
}

/// Print the newest logged exchanges of the configured session
pub(super) fn run_history_command(
    settings: &Settings,
    limit: usize,
    format: &OutputFormat,
) -> Result<()> {
    if !settings.history.persist {
        println!("\nHistory persistence is disabled.\n");
        return Ok(());
    }

    let log = SqliteConversationLog::open(
        settings.database_path(),
        settings.history.session_id.clone(),
    )?;
    let entries = log.entries(limit)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("\nNo conversation in history.\n");
        return Ok(());
    }

    println!("\nSession '{}':\n", log.session_id());
    for entry in entries {
        let date = entry
            .recorded_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "----------------".to_string());
        println!("  {} | User: {}", date, entry.exchange.user_input());
        println!("  {} | Agent: {}", " ".repeat(date.len()), entry.exchange.agent_response());
    }
    println!();
    Ok(())
}

async fn answer(session: &mut ChatSession, name: &str, prompt: &str) -> Result<()> {
    match session.turn(prompt).await {
        Ok(response) => {
            print_response_prefix(name)?;
            println!("{}\n", response);
        }
        Err(e) => {
            tracing::debug!(error = %e, "turn failed");
            let mut stdout = io::stdout();
            stdout.execute(SetForegroundColor(Color::Red))?;
            println!("\nError: {}\n", e);
            stdout.execute(ResetColor)?;
        }
    }
    Ok(())
}

fn print_welcome(name: &str, session: &ChatSession) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    print!("{}", name);
    stdout.execute(ResetColor)?;
    println!(" ({})", session.responder_name());
    if !session.history().is_empty() {
        println!("Restored {} exchanges.", session.history().len());
    }
    println!("Type 'help' for commands, 'quit' to leave.\n");
    Ok(())
}

/// Print the whole logged conversation, including exchanges no longer in context
fn print_history(session: &ChatSession) -> Result<()> {
    let logged = session.logged_history()?;
    if logged.is_empty() {
        println!("\nNo conversation yet.\n");
        return Ok(());
    }
    println!();
    for (i, exchange) in logged.iter().enumerate() {
        println!("{:>3}. User: {}", i + 1, exchange.user_input());
        println!("     Agent: {}", exchange.agent_response());
    }
    println!();
    Ok(())
}

/// Read one line from stdin; `None` at end of input
fn read_user_input() -> Result<Option<String>> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Green))?;
    print!("you: ");
    stdout.execute(ResetColor)?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

/// Print the response prefix with the assistant's name
fn print_response_prefix(name: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    print!("\n{}: ", name);
    stdout.execute(ResetColor)?;
    stdout.flush()?;
    Ok(())
}
