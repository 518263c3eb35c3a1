//! Route fetch error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching a route
///
/// The session controller treats every variant uniformly as "fetch
/// failed"; the distinctions exist for logging and for callers that talk
/// to a backend directly.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("routing backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RouteError {
    /// Whether a later attempt with the same inputs could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            RouteError::Timeout(_) => true,
            RouteError::Network(_) => true,
            RouteError::Backend { status, .. } => *status >= 500,
            RouteError::InvalidResponse(_) => false,
        }
    }
}
