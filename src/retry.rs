//! Retry classification and backoff schedule for artifact fetches
//!
//! Failed artifact downloads are retried with a linearly growing wait: the
//! first attempt starts immediately, attempt n (n ≥ 2) waits `base_delay * n`
//! before starting. The scaling uses the attempt about to be made, so the
//! second attempt already waits twice the base delay. This matches the
//! behavior the certificate backend was tuned against; do not replace it with
//! an exponential curve.

use crate::error::Error;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network errors, non-2xx responses, empty or non-PDF
/// payloads) should return `true`. Failures that more attempts cannot fix
/// (invalid configuration, local disk errors) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Anything the backend or the wire did wrong during a fetch is
            // worth another attempt
            Error::Network(_) => true,
            Error::Api { .. } => true,
            Error::Auth(_) => true,
            Error::Forbidden(_) => true,
            Error::NotFound(_) => true,
            Error::EmptyArtifact { .. } => true,
            Error::UnexpectedPayload { .. } => true,
            // Local problems: retrying cannot help
            Error::Config { .. } => false,
            Error::NothingSelected => false,
            Error::Io(_) => false,
            Error::Serialization(_) => false,
            Error::Spreadsheet(_) => false,
            Error::InvalidRoster(_) => false,
            Error::Url(_) => false,
        }
    }
}

/// Attempt budget and backoff timing for one item
#[derive(Clone, Copy, Debug)]
pub struct RetrySchedule {
    /// Total attempts allowed per item, including the first
    pub max_attempts: u32,
    /// Base delay; attempt n waits n times this
    pub base_delay: Duration,
}

impl RetrySchedule {
    /// Create a schedule from an attempt budget and base delay
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait to observe before starting the given 1-based attempt
    ///
    /// Returns `None` for the first attempt (no wait), and `base_delay * n`
    /// for attempt n thereafter.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt <= 1 {
            None
        } else {
            Some(self.base_delay * attempt)
        }
    }

    /// Whether another attempt may follow a failure of the given 1-based attempt
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
