//! Client error types.

use dealifi_core::CoreError;

use crate::program::ProgramError;

/// Errors that can occur when using the Dealifi client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// JSON-RPC node returned an error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// An account the operation depends on does not exist.
    #[error("account not found: {address}")]
    AccountNotFound {
        /// The missing account.
        address: String,
    },

    /// Validation failed before anything was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Candy machine program call failed.
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the error means an account has not propagated yet.
    #[must_use]
    pub fn is_account_not_found(&self) -> bool {
        match self {
            Self::AccountNotFound { .. } => true,
            Self::Program(err) => err.is_account_not_found(),
            _ => false,
        }
    }
}
