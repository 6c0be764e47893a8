// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Retry logic for collaborator calls with exponential backoff
//!
//! Failures are classified as values instead of being caught and re-raised:
//! the loop asks [`is_retryable`] and either waits and tries again or hands
//! the error back to the caller.

use crate::config::settings::ResilienceConfig;
use crate::error::{ApiError, ConvoError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay in milliseconds (exponentially increased)
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
    /// Jitter percentage (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl From<&ResilienceConfig> for RetryConfig {
    fn from(config: &ResilienceConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
        }
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter: 0.0,
        }
    }

    /// Calculate delay for a given attempt number
    fn calculate_delay(&self, attempt: u32) -> Duration {
        // Exponential backoff: base * 2^attempt
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        let exponential_ms = self.base_delay_ms.saturating_mul(factor);
        let capped_ms = exponential_ms.min(self.max_delay_ms);

        let jitter_range = (capped_ms as f64 * self.jitter) as i64;
        let jitter_ms = if jitter_range > 0 {
            rand::rng().random_range(-jitter_range..=jitter_range)
        } else {
            0
        };

        let final_ms = (capped_ms as i64).saturating_add(jitter_ms).max(0) as u64;
        Duration::from_millis(final_ms)
    }

    /// Delay before retrying after `error`, honoring a server-provided wait.
    fn delay_for(&self, attempt: u32, error: &ConvoError) -> Duration {
        let backoff = self.calculate_delay(attempt);
        match error {
            ConvoError::Api(ApiError::RateLimited(seconds)) => {
                let requested = Duration::from_secs(u64::from(*seconds));
                backoff.max(requested.min(Duration::from_millis(self.max_delay_ms)))
            }
            _ => backoff,
        }
    }
}

/// Determine if an error is transient
pub fn is_retryable(error: &ConvoError) -> bool {
    match error {
        ConvoError::Api(api_error) => match api_error {
            ApiError::Network(_) => true,
            ApiError::RateLimited(_) => true,
            ApiError::Timeout => true,
            ApiError::ServerError { status, .. } => (500..600).contains(status),

            ApiError::AuthenticationFailed => false,
            ApiError::ModelNotFound(_) => false,
            ApiError::InvalidResponse(_) => false,
        },
        ConvoError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
        _ => false,
    }
}

/// Retry an async operation with exponential backoff
///
/// Stops on success, on the first non-retryable error, or once
/// `config.max_retries` retries have been spent.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(
                        operation = operation_name,
                        attempts = attempt + 1,
                        "succeeded after retrying"
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                if !is_retryable(&error) {
                    tracing::debug!(
                        operation = operation_name,
                        %error,
                        "non-retryable error"
                    );
                    return Err(error);
                }

                if attempt >= config.max_retries {
                    tracing::warn!(
                        operation = operation_name,
                        retries = config.max_retries,
                        %error,
                        "retries exhausted"
                    );
                    return Err(error);
                }

                let delay = config.delay_for(attempt, &error);
                tracing::warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    %error,
                    "retrying in {:.1}s",
                    delay.as_secs_f64()
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
