// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use convo::chat::{ChatCommand, ChatSession};
use convo::config::Settings;
use convo::error::{ApiError, ConvoError, Result};
use convo::history::{ConversationLog, Exchange, SqliteConversationLog};
use convo::llm::MockResponder;
use convo::mail::{IncomingMail, MailTransport};

/// Transport with a fixed inbox that records what was sent
#[derive(Default)]
struct FakeTransport {
    inbox: Mutex<Option<IncomingMail>>,
    sent: Mutex<Vec<(String, String, String)>>,
    fail_send: bool,
}

impl FakeTransport {
    fn with_mail(from: &str, subject: &str, body: &str) -> Self {
        Self {
            inbox: Mutex::new(Some(IncomingMail {
                from: from.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            })),
            ..Default::default()
        }
    }

    fn failing(mut self) -> Self {
        self.fail_send = true;
        self
    }
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail_send {
            return Err(ConvoError::Mail("connection refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }

    async fn receive(&self) -> Result<Option<IncomingMail>> {
        Ok(self.inbox.lock().unwrap().take())
    }
}

fn sqlite_log(dir: &TempDir, session: &str) -> Box<dyn ConversationLog> {
    Box::new(SqliteConversationLog::open(dir.path().join("conversation.db"), session).unwrap())
}

#[tokio::test]
async fn test_turn_prompt_contains_bounded_history() {
    let mock = MockResponder::new().with_responses(["hello", "goodbye", "sure"]);
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(mock.clone()))
        .build()
        .unwrap();

    session.turn("hi").await.unwrap();
    session.turn("bye").await.unwrap();
    session.turn("again?").await.unwrap();

    let prompts = mock.prompts();
    assert_eq!(prompts[0], "\nUser: hi\nAgent:");
    assert_eq!(
        prompts[2],
        "User: hi\nAgent: hello\nUser: bye\nAgent: goodbye\nUser: again?\nAgent:"
    );
}

#[tokio::test]
async fn test_small_budget_drops_old_context() {
    let long = "z".repeat(400);
    let mock = MockResponder::new().with_responses([long.as_str(), "short"]);
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(mock.clone()))
        .with_context_budget(50)
        .build()
        .unwrap();

    session.turn("first").await.unwrap();
    session.turn("second").await.unwrap();

    // The 100-unit first exchange does not fit a 50-unit budget
    assert_eq!(mock.last_prompt().unwrap(), "\nUser: second\nAgent:");
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_sqlite_log_restores_history_on_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let mut session = ChatSession::builder()
            .with_responder(Arc::new(MockResponder::new().with_responses(["hello", "goodbye"])))
            .with_log(sqlite_log(&dir, "alice"))
            .build()
            .unwrap();
        session.turn("hi").await.unwrap();
        session.turn("bye").await.unwrap();
    }

    let restored = ChatSession::builder()
        .with_responder(Arc::new(MockResponder::always("ok")))
        .with_log(sqlite_log(&dir, "alice"))
        .build()
        .unwrap();
    assert_eq!(
        restored.history().all(),
        vec![Exchange::new("hi", "hello"), Exchange::new("bye", "goodbye")]
    );

    let other = ChatSession::builder()
        .with_responder(Arc::new(MockResponder::always("ok")))
        .with_log(sqlite_log(&dir, "bob"))
        .build()
        .unwrap();
    assert!(other.history().is_empty());
}

#[tokio::test]
async fn test_restore_respects_max_history_length() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = ChatSession::builder()
            .with_responder(Arc::new(MockResponder::always("ok")))
            .with_log(sqlite_log(&dir, "default"))
            .build()
            .unwrap();
        for input in ["a", "b", "c", "d"] {
            session.turn(input).await.unwrap();
        }
    }

    let restored = ChatSession::builder()
        .with_responder(Arc::new(MockResponder::always("ok")))
        .with_log(sqlite_log(&dir, "default"))
        .with_max_history_length(Some(2))
        .build()
        .unwrap();
    let inputs: Vec<_> = restored
        .history()
        .exchanges()
        .map(|e| e.user_input().to_string())
        .collect();
    assert_eq!(inputs, vec!["c", "d"]);
}

#[tokio::test]
async fn test_reset_keeps_persistent_log() {
    let dir = TempDir::new().unwrap();
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(MockResponder::always("ok")))
        .with_log(sqlite_log(&dir, "default"))
        .build()
        .unwrap();
    session.turn("remember me").await.unwrap();
    session.reset();
    assert!(session.history().is_empty());

    let log = SqliteConversationLog::open(dir.path().join("conversation.db"), "default").unwrap();
    assert_eq!(log.count().unwrap(), 1);
}

#[tokio::test]
async fn test_failed_turn_is_not_logged() {
    let dir = TempDir::new().unwrap();
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(
            MockResponder::new().with_error(ConvoError::Api(ApiError::AuthenticationFailed)),
        ))
        .with_log(sqlite_log(&dir, "default"))
        .build()
        .unwrap();

    let err = session.turn("hi").await.unwrap_err();
    assert!(matches!(err, ConvoError::Api(ApiError::AuthenticationFailed)));

    let log = SqliteConversationLog::open(dir.path().join("conversation.db"), "default").unwrap();
    assert_eq!(log.count().unwrap(), 0);
}

#[tokio::test]
async fn test_answer_mail_replies_and_records() {
    let mock = MockResponder::always("The library opens at 9.");
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(mock.clone()))
        .build()
        .unwrap();
    let transport = FakeTransport::with_mail("student@example.com", "Library hours", "When?");

    let reply = session.answer_mail(&transport).await.unwrap().unwrap();

    assert!(reply.delivered);
    assert_eq!(reply.subject, "Re: Library hours");
    assert_eq!(mock.last_prompt().unwrap(), "User: When?\nAgent:");
    assert_eq!(
        transport.sent.lock().unwrap().clone(),
        vec![(
            "student@example.com".to_string(),
            "Re: Library hours".to_string(),
            "The library opens at 9.".to_string()
        )]
    );
    assert_eq!(
        session.history().all(),
        vec![Exchange::new("When?", "The library opens at 9.")]
    );
}

#[tokio::test]
async fn test_answer_mail_with_empty_inbox() {
    let mock = MockResponder::always("unused");
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(mock.clone()))
        .build()
        .unwrap();

    let reply = session.answer_mail(&FakeTransport::default()).await.unwrap();
    assert!(reply.is_none());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_answer_mail_failed_send_is_reported() {
    let mut session = ChatSession::builder()
        .with_responder(Arc::new(MockResponder::always("answer")))
        .build()
        .unwrap();
    let transport = FakeTransport::with_mail("a@example.com", "Re: hello", "ping").failing();

    let reply = session.answer_mail(&transport).await.unwrap().unwrap();
    assert!(!reply.delivered);
    assert_eq!(reply.subject, "Re: hello");
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_builder_from_settings() {
    let mut settings = Settings::default();
    settings.history.max_context_tokens = 1234;
    settings.history.max_history_length = Some(3);

    let session = convo::chat::ChatSessionBuilder::from_settings(&settings)
        .with_responder(Arc::new(MockResponder::always("ok")))
        .build()
        .unwrap();
    assert_eq!(session.context_budget(), 1234);
    assert_eq!(session.history().max_len(), Some(3));
    assert_eq!(session.responder_name(), "mock");
}

#[test]
fn test_shell_line_dispatch() {
    assert_eq!(ChatCommand::parse("quit"), ChatCommand::Exit);
    assert_eq!(
        ChatCommand::parse("check_mail"),
        ChatCommand::Prompt("check_mail".to_string())
    );
    assert_eq!(
        ChatCommand::parse("What is DIU?"),
        ChatCommand::Prompt("What is DIU?".to_string())
    );
}

#[tokio::test]
async fn test_default_settings_keep_whole_log_in_context() {
    let dir = TempDir::new().unwrap();
    {
        let mut log = SqliteConversationLog::open(dir.path().join("conversation.db"), "default")
            .unwrap();
        for i in 0..20 {
            log.append(&Exchange::new(format!("q{}", i), format!("a{}", i)))
                .unwrap();
        }
    }

    let session = convo::chat::ChatSessionBuilder::from_settings(&Settings::default())
        .with_responder(Arc::new(MockResponder::always("ok")))
        .with_log(sqlite_log(&dir, "default"))
        .build()
        .unwrap();

    assert_eq!(session.history().len(), 20);
    let prompt = session.build_prompt("next").unwrap();
    assert!(prompt.starts_with("User: q0\nAgent: a0\n"));
    assert_eq!(prompt.matches("User: ").count(), 21);
}

#[tokio::test]
async fn test_logged_history_reads_full_log_after_restore() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = ChatSession::builder()
            .with_responder(Arc::new(MockResponder::always("ok")))
            .with_log(sqlite_log(&dir, "default"))
            .build()
            .unwrap();
        for input in ["a", "b", "c"] {
            session.turn(input).await.unwrap();
        }
    }

    let mut restored = ChatSession::builder()
        .with_responder(Arc::new(MockResponder::always("ok")))
        .with_log(sqlite_log(&dir, "default"))
        .with_max_history_length(Some(1))
        .build()
        .unwrap();
    restored.reset();

    let inputs: Vec<_> = restored
        .logged_history()
        .unwrap()
        .iter()
        .map(|e| e.user_input().to_string())
        .collect();
    assert_eq!(inputs, vec!["a", "b", "c"]);
}
