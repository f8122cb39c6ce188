//! API handlers.

pub mod candy_machines;
pub mod health;
pub mod merchants;
pub mod metadata;

use dealifi_core::WalletAddress;

use crate::error::ApiError;

/// Parse a base58 address taken from a path or body field.
pub(crate) fn parse_address(field: &str, value: &str) -> Result<WalletAddress, ApiError> {
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {field}: {e}")))
}
