//! Error types for cert-desk
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (API, export, import)
//! - Conversions from the underlying HTTP, I/O, and spreadsheet errors
//! - Context information (certificate id, HTTP status, configuration key)

use crate::types::CertificateId;
use thiserror::Error;

/// Result type alias for cert-desk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cert-desk
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "export.max_attempts")
        key: Option<String>,
    },

    /// Network error (connection, timeout, TLS, malformed response body)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend rejected the request with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// Error message extracted from the backend's response body
        message: String,
    },

    /// Authentication failure (missing or rejected session token)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The authenticated user lacks permission for this operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested resource does not exist on the backend
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend returned an empty artifact body
    #[error("empty artifact for certificate {id}")]
    EmptyArtifact {
        /// The certificate whose artifact came back empty
        id: CertificateId,
    },

    /// The backend returned something other than a PDF for an artifact request
    #[error("unexpected payload for certificate {id}: {detail}")]
    UnexpectedPayload {
        /// The certificate whose artifact request misbehaved
        id: CertificateId,
        /// Content type or decoded backend error message
        detail: String,
    },

    /// An export run was requested with no certificates selected
    #[error("nothing selected: export requires at least one certificate id")]
    NothingSelected,

    /// I/O error (artifact saving, roster file reading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Spreadsheet could not be opened or read
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Roster content is structurally unusable (missing sheet, missing headers)
    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    /// Base URL could not be parsed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Build an `Api`/`Auth`/`Forbidden`/`NotFound` error from an HTTP status
    /// and the message decoded from the backend's error body.
    ///
    /// The backend reports failures as `{"error": "..."}`; callers pass the
    /// extracted message (or a fallback) and this picks the variant that lets
    /// downstream code match on the interesting statuses without re-parsing.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Error::Auth(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }
}
