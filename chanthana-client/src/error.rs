//! Client error types

use shared::ValidationError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// API key rejected
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Base, table or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by the API (400/422)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Too many requests
    #[error("Rate limited, retry later")]
    RateLimited,

    /// Any other non-success status
    #[error("Airtable error {status}: {message}")]
    Api { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No API key or base configured
    #[error("Configuration Airtable manquante")]
    NotConfigured,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Order record created but some of its lines were not
    #[error("Order {order_id} created without all its lines: {source}")]
    PartialOrder {
        order_id: String,
        #[source]
        source: Box<ClientError>,
    },

    /// Draft rejected before any request
    #[error(transparent)]
    Draft(#[from] ValidationError),
}

impl ClientError {
    /// Status code of API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited => Some(429),
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::PartialOrder { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
