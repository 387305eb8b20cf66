use thiserror::Error;

use crate::{configuration::ConfigurationError, export::ExportError, token_cache::TokenCacheError};

/// Error types that can occur while talking to the migasfree API
///
/// Every error is returned to the caller as soon as it happens. The client never
/// retries a request and never recovers locally.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token endpoint answered with a status outside the acceptable set
    #[error("authentication failed with status code {status}")]
    Authentication { status: u16 },
    /// No password could be obtained from the credential provider
    #[error("can not continue without password")]
    Credential,
    /// A read or create operation answered with an unexpected status
    #[error("status code {status}")]
    Http { status: u16 },
    /// A singular lookup matched no records
    #[error("not found")]
    NotFound,
    /// A singular lookup matched more than one record
    #[error("multiple records found ({count})")]
    AmbiguousResult { count: u64 },
    /// The server answered successfully but the body has an unexpected shape
    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),
    /// Transport level failure, reported as-is by the HTTP layer
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token cache error: {0}")]
    TokenCache(#[from] TokenCacheError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
