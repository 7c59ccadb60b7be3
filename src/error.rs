//! Error types for the crate.

use thiserror::Error;

use crate::domain::DomainError;

/// Configuration errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors surfaced by venue adapters.
///
/// This is the collaborator contract the engine retries against:
/// [`VenueError::is_retryable`] separates transient transport conditions
/// from fatal order errors, and the execution coordinator never retries
/// the latter.
#[derive(Error, Debug, Clone)]
pub enum VenueError {
    /// The venue does not know the requested market or token.
    #[error("not found on venue: {reference}")]
    NotFound { reference: String },

    /// Transport failure — venue unreachable, timeout, transient 5xx.
    #[error("venue unavailable: {0}")]
    Unavailable(String),

    /// The venue asked us to slow down.
    #[error("rate limited{}", .retry_after_secs.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited {
        /// Venue-suggested wait, when the response carried one.
        retry_after_secs: Option<u64>,
    },

    /// Balance too small for the requested order.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The venue rejected the order parameters.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Credentials missing, expired, or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl VenueError {
    /// True for transient conditions worth a bounded retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::RateLimited { .. })
    }
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.status().map(|s| s.as_u16()) == Some(429) {
            return Self::RateLimited {
                retry_after_secs: None,
            };
        }
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                Self::Auth(err.to_string())
            }
            Some(status) if status.as_u16() == 404 => Self::NotFound {
                reference: err.to_string(),
            },
            _ => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for VenueError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
