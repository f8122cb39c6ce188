//! Error types for Dealifi core operations.

use crate::address::AddressError;
use crate::WalletAddress;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in core domain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// An address failed to parse.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The candy machine is not registered under the merchant.
    #[error("candy machine not found: {address}")]
    CandyMachineNotFound {
        /// The candy machine address.
        address: WalletAddress,
    },

    /// A config line name prefix exceeds the on-chain limit.
    #[error("prefix name '{prefix}' exceeds {max} chars; use a shorter symbol")]
    NameTooLong {
        /// The offending prefix.
        prefix: String,
        /// Maximum length in bytes.
        max: usize,
    },

    /// A config line URI prefix exceeds the on-chain limit.
    #[error("prefix URI '{prefix}' exceeds {max} chars")]
    UriTooLong {
        /// The offending prefix.
        prefix: String,
        /// Maximum length in bytes.
        max: usize,
    },

    /// Every item has already been minted.
    #[error("candy machine is empty")]
    CandyMachineEmpty,

    /// No config lines have been loaded.
    #[error("candy machine has no items loaded; add items first")]
    NoItemsLoaded,

    /// Fewer config lines are loaded than the next mint needs.
    #[error("not enough items loaded to mint: loaded={loaded}, required={required}")]
    NotEnoughItemsLoaded {
        /// Items currently loaded.
        loaded: u64,
        /// Items needed for the next mint.
        required: u64,
    },

    /// Candy machines must be fully loaded before the first mint.
    #[error("candy machine must be fully loaded before minting: loaded {loaded} / {available}")]
    NotFullyLoaded {
        /// Items currently loaded.
        loaded: u64,
        /// Items the candy machine was created with.
        available: u64,
    },

    /// Unknown deal status discriminant.
    #[error("unknown deal status: {0}")]
    UnknownDealStatus(u8),
}
