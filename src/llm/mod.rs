// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for convo
//!
//! The agent runtime behind a single `respond(prompt)` capability, plus the
//! retry policy its HTTP calls run under.

pub mod groq;
pub mod mock;
pub mod responder;
pub mod retry;

pub use groq::ChatCompletionsResponder;
pub use mock::MockResponder;
pub use responder::{Responder, NO_RESPONSE};
