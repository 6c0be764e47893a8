// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mail transport seam
//!
//! Incoming mail is answered by the agent and the answer is mailed back.
//! The SMTP/IMAP plumbing lives behind [`MailTransport`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The newest unseen message in the inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMail {
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Send and receive capability
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;

    /// Fetch the latest unseen message, if any
    async fn receive(&self) -> Result<Option<IncomingMail>>;
}

/// Subject line for a reply, without stacking `Re:` prefixes
pub fn reply_subject(subject: &str) -> String {
    let trimmed = subject.trim();
    let already_reply = trimmed
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("re:"));

    if already_reply {
        trimmed.to_string()
    } else {
        format!("Re: {}", trimmed)
    }
}
