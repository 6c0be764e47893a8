// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock responder for testing
//!
//! Replays a scripted list of replies and records every prompt it receives,
//! so sessions can be exercised without an API key.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ConvoError, Result};
use crate::llm::responder::Responder;

/// One scripted reply
#[derive(Debug)]
pub enum MockReply {
    Text(String),
    Error(ConvoError),
}

/// A scripted responder
#[derive(Clone, Default)]
pub struct MockResponder {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Returned once the script runs out
    fallback: Arc<Mutex<Option<String>>>,
    call_count: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock responder lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every prompt with the same text
    pub fn always(text: impl Into<String>) -> Self {
        let mock = Self::new();
        *lock(&mock.fallback) = Some(text.into());
        mock
    }

    /// Queue a text reply
    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.replies).push_back(MockReply::Text(text.into()));
        self
    }

    /// Queue several text replies, returned in order
    pub fn with_responses<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut replies = lock(&self.replies);
            for text in texts {
                replies.push_back(MockReply::Text(text.into()));
            }
        }
        self
    }

    /// Queue a failure
    pub fn with_error(self, error: ConvoError) -> Self {
        lock(&self.replies).push_back(MockReply::Error(error));
        self
    }

    /// Number of times `respond` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().cloned()
    }
}

#[async_trait]
impl Responder for MockResponder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn respond(&self, prompt: &str) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push(prompt.to_string());

        let next = lock(&self.replies).pop_front();
        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(error)) => Err(error),
            None => lock(&self.fallback).clone().ok_or_else(|| {
                ConvoError::InvalidInput("mock responder has no scripted reply left".to_string())
            }),
        }
    }
}
