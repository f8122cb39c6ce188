//! Error types for Dealifi storage.

use dealifi_core::{CoreError, WalletAddress};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The candy machine is already registered under a different merchant.
    #[error("candy machine {candy_machine} is owned by merchant {owner}")]
    CandyMachineOwned {
        /// The candy machine address.
        candy_machine: WalletAddress,
        /// The merchant that owns it.
        owner: WalletAddress,
    },
}

impl StoreError {
    pub(crate) fn merchant_not_found(address: &WalletAddress) -> Self {
        Self::NotFound {
            entity: "merchant",
            id: address.to_string(),
        }
    }

    pub(crate) fn candy_machine_not_found(address: &WalletAddress) -> Self {
        Self::NotFound {
            entity: "candy machine",
            id: address.to_string(),
        }
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CandyMachineNotFound { address } => Self::candy_machine_not_found(&address),
            other => Self::Database(other.to_string()),
        }
    }
}
