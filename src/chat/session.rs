// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat session management
//!
//! Ties the history manager to its collaborators: the conversation log it is
//! restored from and appended to, and the responder that answers prompts.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::{ConvoError, Result};
use crate::history::{ConversationLog, Exchange, HistoryManager, MemoryConversationLog};
use crate::llm::Responder;
use crate::mail::{reply_subject, IncomingMail, MailTransport};

/// Default estimated-token budget for history in a prompt
pub const DEFAULT_CONTEXT_BUDGET: i64 = 5000;

/// Outcome of answering one email
#[derive(Debug, Clone)]
pub struct MailReply {
    /// The message that was answered
    pub mail: IncomingMail,
    /// Subject the reply was sent under
    pub subject: String,
    /// Agent's answer, also recorded in history
    pub response: String,
    /// Whether the transport accepted the reply
    pub delivered: bool,
}

/// One conversation: memory, persistence and the agent answering it
pub struct ChatSession {
    history: HistoryManager,
    log: Box<dyn ConversationLog>,
    responder: Arc<dyn Responder>,
    context_budget: i64,
}

/// Builder for creating ChatSession instances
pub struct ChatSessionBuilder {
    responder: Option<Arc<dyn Responder>>,
    log: Option<Box<dyn ConversationLog>>,
    context_budget: i64,
    max_history_length: Option<usize>,
}

impl Default for ChatSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSessionBuilder {
    /// Unbounded history, default budget, in-memory log
    pub fn new() -> Self {
        Self {
            responder: None,
            log: None,
            context_budget: DEFAULT_CONTEXT_BUDGET,
            max_history_length: None,
        }
    }

    /// Take budget and history bound from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_context_budget(settings.history.max_context_tokens)
            .with_max_history_length(settings.history.max_history_length)
    }

    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    pub fn with_log(mut self, log: Box<dyn ConversationLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_context_budget(mut self, budget: i64) -> Self {
        self.context_budget = budget;
        self
    }

    pub fn with_max_history_length(mut self, max_len: Option<usize>) -> Self {
        self.max_history_length = max_len;
        self
    }

    /// Build the session, restoring history from the log
    pub fn build(self) -> Result<ChatSession> {
        let responder = self
            .responder
            .ok_or_else(|| ConvoError::Config("No responder set".into()))?;
        if self.context_budget < 0 {
            return Err(ConvoError::InvalidBudget(self.context_budget));
        }

        let log = self
            .log
            .unwrap_or_else(|| Box::new(MemoryConversationLog::new()));
        let history = HistoryManager::from_exchanges(log.all()?, self.max_history_length);

        tracing::debug!(
            restored = history.len(),
            responder = responder.name(),
            budget = self.context_budget,
            "chat session ready"
        );

        Ok(ChatSession {
            history,
            log,
            responder,
            context_budget: self.context_budget,
        })
    }
}

impl ChatSession {
    pub fn builder() -> ChatSessionBuilder {
        ChatSessionBuilder::new()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Every exchange in the conversation log, oldest first.
    ///
    /// Unlike [`history`](Self::history) this survives [`reset`](Self::reset)
    /// and the in-memory length bound.
    pub fn logged_history(&self) -> Result<Vec<Exchange>> {
        self.log.all()
    }

    pub fn context_budget(&self) -> i64 {
        self.context_budget
    }

    pub fn responder_name(&self) -> &str {
        self.responder.name()
    }

    /// Prompt for `input`: the bounded history followed by the new turn
    pub fn build_prompt(&self, input: &str) -> Result<String> {
        let context = self.history.bounded_context(self.context_budget)?;
        let rendered = HistoryManager::render_context(&context);
        Ok(format!("{}\nUser: {}\nAgent:", rendered, input))
    }

    /// Ask the agent about `input` and record the exchange.
    ///
    /// Nothing is recorded when the responder fails.
    pub async fn turn(&mut self, input: &str) -> Result<String> {
        let prompt = self.build_prompt(input)?;
        let response = self.responder.respond(&prompt).await?;
        self.commit(Exchange::new(input, response.clone()));
        Ok(response)
    }

    /// Answer the newest unseen email, if there is one.
    ///
    /// The mail body is the user side of the exchange. A failed send is
    /// reported through [`MailReply::delivered`]; the exchange stays recorded.
    pub async fn answer_mail(&mut self, transport: &dyn MailTransport) -> Result<Option<MailReply>> {
        let Some(mail) = transport.receive().await? else {
            tracing::debug!("no unseen mail");
            return Ok(None);
        };

        tracing::info!(from = %mail.from, subject = %mail.subject, "answering mail");
        let prompt = format!("User: {}\nAgent:", mail.body);
        let response = self.responder.respond(&prompt).await?;
        self.commit(Exchange::new(mail.body.clone(), response.clone()));

        let subject = reply_subject(&mail.subject);
        let delivered = match transport.send(&mail.from, &subject, &response).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(to = %mail.from, error = %e, "failed to send mail reply");
                false
            }
        };

        Ok(Some(MailReply {
            mail,
            subject,
            response,
            delivered,
        }))
    }

    /// Forget the in-memory conversation; the persistent log is append-only
    pub fn reset(&mut self) {
        self.history.clear();
    }

    fn commit(&mut self, exchange: Exchange) {
        if let Err(e) = self.log.append(&exchange) {
            tracing::error!(error = %e, "failed to persist exchange");
        }
        self.history.push(exchange);
    }
}
