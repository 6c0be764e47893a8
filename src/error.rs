// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for convo
//!
//! The history core only fails on contract violations (a negative budget).
//! Everything else here belongs to the collaborators around it: storage,
//! the LLM endpoint, mail and configuration.

use thiserror::Error;

/// Main error type for convo operations
#[derive(Error, Debug)]
pub enum ConvoError {
    /// A context budget below zero was requested
    #[error("Invalid budget: {0} (must be zero or greater)")]
    InvalidBudget(i64),

    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Conversation log errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Mail transport errors
    #[error("Mail error: {0}")]
    Mail(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,
}

/// Result type alias for convo operations
pub type Result<T> = std::result::Result<T, ConvoError>;

impl From<rusqlite::Error> for ConvoError {
    fn from(err: rusqlite::Error) -> Self {
        ConvoError::Storage(err.to_string())
    }
}
