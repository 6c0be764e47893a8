// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Responder trait
//!
//! The agent runtime is consumed as an opaque capability: a prompt goes in,
//! text comes out. Search-, scrape- or mail-backed agents all sit behind it.

use async_trait::async_trait;

use crate::error::Result;

/// Text returned when the endpoint produced no content
pub const NO_RESPONSE: &str = "No response generated.";

/// Something that can answer a prompt
#[async_trait]
pub trait Responder: Send + Sync {
    /// Short name for logs (e.g., "groq", "mock")
    fn name(&self) -> &str;

    /// Produce a response for the fully assembled prompt
    async fn respond(&self, prompt: &str) -> Result<String>;
}
