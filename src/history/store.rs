// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation log storage
//!
//! An append-only log of exchanges that outlives the process. The
//! [`HistoryManager`](super::HistoryManager) is rebuilt from it on startup and
//! every completed turn is appended to it.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::exchange::Exchange;
use crate::error::{ConvoError, Result};

/// Append-only persistence for exchanges
pub trait ConversationLog: Send {
    /// Persist one exchange at the end of the log
    fn append(&mut self, exchange: &Exchange) -> Result<()>;

    /// Every logged exchange, oldest first
    fn all(&self) -> Result<Vec<Exchange>>;
}

/// Log kept in process memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryConversationLog {
    exchanges: Vec<Exchange>,
}

impl MemoryConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl ConversationLog for MemoryConversationLog {
    fn append(&mut self, exchange: &Exchange) -> Result<()> {
        self.exchanges.push(exchange.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<Exchange>> {
        Ok(self.exchanges.clone())
    }
}

/// A logged exchange together with when it was written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedExchange {
    pub exchange: Exchange,
    /// Missing for rows migrated from databases that predate timestamps
    pub recorded_at: Option<DateTime<Utc>>,
}

/// SQLite-backed log, scoped to one session id
pub struct SqliteConversationLog {
    conn: Connection,
    session_id: String,
}

impl SqliteConversationLog {
    /// Open or create a log at the given path
    pub fn open<P: AsRef<Path>>(path: P, session_id: impl Into<String>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref()).map_err(|e| {
            ConvoError::Storage(format!("Failed to open conversation database: {}", e))
        })?;
        Self::with_connection(conn, session_id)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory(session_id: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ConvoError::Storage(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::with_connection(conn, session_id)
    }

    fn with_connection(conn: Connection, session_id: impl Into<String>) -> Result<Self> {
        let log = Self {
            conn,
            session_id: session_id.into(),
        };
        log.init_schema()?;
        Ok(log)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Create the table, repairing or upgrading an existing one.
    ///
    /// A table without `user_input`/`agent_response` is unusable and is
    /// dropped. A table that only lacks `session_id`/`recorded_at` is
    /// upgraded in place so its rows stay readable.
    fn init_schema(&self) -> Result<()> {
        let exists = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'conversations'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ConvoError::Storage(format!("Failed to inspect schema: {}", e)))?
            .is_some();

        if exists {
            let columns = self.table_columns()?;
            let has = |name: &str| columns.iter().any(|c| c == name);

            if !has("user_input") || !has("agent_response") {
                tracing::warn!("incorrect conversations schema detected, recreating table");
                self.conn
                    .execute("DROP TABLE conversations", [])
                    .map_err(|e| ConvoError::Storage(format!("Failed to drop table: {}", e)))?;
            } else {
                if !has("session_id") {
                    tracing::info!("adding session_id column to conversations table");
                    self.conn
                        .execute(
                            "ALTER TABLE conversations
                             ADD COLUMN session_id TEXT NOT NULL DEFAULT 'default'",
                            [],
                        )
                        .map_err(|e| ConvoError::Storage(format!("Failed to migrate: {}", e)))?;
                }
                if !has("recorded_at") {
                    tracing::info!("adding recorded_at column to conversations table");
                    self.conn
                        .execute(
                            "ALTER TABLE conversations
                             ADD COLUMN recorded_at TEXT NOT NULL DEFAULT ''",
                            [],
                        )
                        .map_err(|e| ConvoError::Storage(format!("Failed to migrate: {}", e)))?;
                }
            }
        }

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS conversations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    session_id TEXT NOT NULL DEFAULT 'default',
                    user_input TEXT,
                    agent_response TEXT,
                    recorded_at TEXT NOT NULL DEFAULT ''
                )",
                [],
            )
            .map_err(|e| ConvoError::Storage(format!("Failed to create schema: {}", e)))?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_conversations_session
                 ON conversations(session_id, id)",
                [],
            )
            .map_err(|e| ConvoError::Storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }

    fn table_columns(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("PRAGMA table_info(conversations)")
            .map_err(|e| ConvoError::Storage(format!("Failed to inspect schema: {}", e)))?;

        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(|e| ConvoError::Storage(format!("Failed to inspect schema: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(columns)
    }

    /// The newest `limit` entries with timestamps, oldest first
    pub fn entries(&self, limit: usize) -> Result<Vec<LoggedExchange>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_input, agent_response, recorded_at
                 FROM conversations
                 WHERE session_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| ConvoError::Storage(format!("Failed to prepare query: {}", e)))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut entries = stmt
            .query_map(params![self.session_id, limit], |row| {
                let user_input: Option<String> = row.get(0)?;
                let agent_response: Option<String> = row.get(1)?;
                let recorded_at: String = row.get(2)?;

                Ok(LoggedExchange {
                    exchange: Exchange::new(
                        user_input.unwrap_or_default(),
                        agent_response.unwrap_or_default(),
                    ),
                    recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .ok(),
                })
            })
            .map_err(|e| ConvoError::Storage(format!("Failed to query entries: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        entries.reverse();
        Ok(entries)
    }

    /// Number of exchanges logged for this session
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM conversations WHERE session_id = ?1",
                params![self.session_id],
                |row| row.get(0),
            )
            .map_err(|e| ConvoError::Storage(format!("Failed to count entries: {}", e)))?;

        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl ConversationLog for SqliteConversationLog {
    fn append(&mut self, exchange: &Exchange) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO conversations (session_id, user_input, agent_response, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    self.session_id,
                    exchange.user_input(),
                    exchange.agent_response(),
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| ConvoError::Storage(format!("Failed to append exchange: {}", e)))?;

        Ok(())
    }

    fn all(&self) -> Result<Vec<Exchange>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT user_input, agent_response
                 FROM conversations
                 WHERE session_id = ?1
                 ORDER BY id ASC",
            )
            .map_err(|e| ConvoError::Storage(format!("Failed to prepare query: {}", e)))?;

        let exchanges = stmt
            .query_map(params![self.session_id], |row| {
                let user_input: Option<String> = row.get(0)?;
                let agent_response: Option<String> = row.get(1)?;
                Ok(Exchange::new(
                    user_input.unwrap_or_default(),
                    agent_response.unwrap_or_default(),
                ))
            })
            .map_err(|e| ConvoError::Storage(format!("Failed to load exchanges: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(exchanges)
    }
}
