//! Key encoding utilities for `RocksDB`.

use dealifi_core::{WalletAddress, ADDRESS_LEN};

/// Create a merchant key from the merchant's wallet address.
#[must_use]
pub fn merchant_key(address: &WalletAddress) -> Vec<u8> {
    address.as_bytes().to_vec()
}

/// Create a candy machine owner index key.
#[must_use]
pub fn candy_machine_key(address: &WalletAddress) -> Vec<u8> {
    address.as_bytes().to_vec()
}

/// Decode an address stored as a key or index value.
#[must_use]
pub fn decode_address(bytes: &[u8]) -> Option<WalletAddress> {
    let key: [u8; ADDRESS_LEN] = bytes.try_into().ok()?;
    Some(WalletAddress::from_bytes(key))
}
