// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation history
//!
//! Records exchanged (query, response) pairs and selects the newest slice of
//! them that fits a prompt budget.

pub mod exchange;
pub mod manager;
pub mod store;

pub use exchange::{estimate_units, Exchange, CHARS_PER_UNIT};
pub use manager::HistoryManager;
pub use store::{ConversationLog, LoggedExchange, MemoryConversationLog, SqliteConversationLog};
