// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation memory with token-budget truncation
//!
//! `HistoryManager` keeps the ordered log of exchanges for one conversation
//! and selects the newest slice of it that fits a prompt budget. It performs
//! no I/O; persistence is layered on top through [`super::ConversationLog`].

use std::collections::VecDeque;

use super::exchange::Exchange;
use crate::error::{ConvoError, Result};

/// Ordered, optionally bounded, in-memory conversation history
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    exchanges: VecDeque<Exchange>,
    /// When set, the oldest exchange is evicted once this length is exceeded
    max_len: Option<usize>,
}

impl HistoryManager {
    /// Create an unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `max_len` exchanges (FIFO eviction)
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            exchanges: VecDeque::with_capacity(max_len.min(64)),
            max_len: Some(max_len),
        }
    }

    /// Rebuild a history from previously logged exchanges, oldest first.
    ///
    /// With a bound, only the newest `max_len` exchanges are kept.
    pub fn from_exchanges<I>(exchanges: I, max_len: Option<usize>) -> Self
    where
        I: IntoIterator<Item = Exchange>,
    {
        let mut manager = Self {
            exchanges: VecDeque::new(),
            max_len,
        };
        for exchange in exchanges {
            manager.push(exchange);
        }
        manager
    }

    /// Append a turn to the end of the history
    pub fn record(&mut self, user_input: impl Into<String>, agent_response: impl Into<String>) {
        self.push(Exchange::new(user_input, agent_response));
    }

    /// Append an already-built exchange
    pub fn push(&mut self, exchange: Exchange) {
        self.exchanges.push_back(exchange);

        if let Some(max_len) = self.max_len {
            while self.exchanges.len() > max_len {
                self.exchanges.pop_front();
                tracing::debug!(max_len, "evicted oldest exchange from history");
            }
        }
    }

    /// Full history in chronological order
    pub fn all(&self) -> Vec<Exchange> {
        self.exchanges.iter().cloned().collect()
    }

    /// Borrowing iterator over the history, oldest first
    pub fn exchanges(&self) -> impl DoubleEndedIterator<Item = &Exchange> + ExactSizeIterator {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    /// Select the longest chronological suffix whose estimated size fits `max_units`.
    ///
    /// Walks from the newest exchange backward and stops before the first one
    /// that would push the running total over the budget, so an oversized
    /// exchange is never returned partially. A zero budget admits nothing.
    pub fn bounded_context(&self, max_units: i64) -> Result<Vec<Exchange>> {
        if max_units < 0 {
            return Err(ConvoError::InvalidBudget(max_units));
        }
        if max_units == 0 {
            return Ok(Vec::new());
        }

        let budget = usize::try_from(max_units).unwrap_or(usize::MAX);
        let mut total = 0usize;
        let mut selected = Vec::new();

        for exchange in self.exchanges.iter().rev() {
            let next = total.saturating_add(exchange.units());
            if next > budget {
                break;
            }
            total = next;
            selected.push(exchange.clone());
        }

        selected.reverse();
        tracing::debug!(
            budget,
            used = total,
            kept = selected.len(),
            total_exchanges = self.exchanges.len(),
            "selected bounded context"
        );
        Ok(selected)
    }

    /// Format exchanges as `User:`/`Agent:` blocks separated by newlines
    pub fn render_context(exchanges: &[Exchange]) -> String {
        exchanges
            .iter()
            .map(Exchange::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop every exchange
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}
