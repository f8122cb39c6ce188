//! `RocksDB` storage layer for Dealifi.
//!
//! This crate keeps a display mirror of merchants and their candy machines.
//! The chain stays authoritative; the store exists so the marketplace can list
//! deals without an RPC round trip per candy machine.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `merchants`: Merchant documents (CBOR), keyed by merchant address
//! - `candy_machine_owners`: Index from candy machine address to merchant address
//!
//! # Example
//!
//! ```no_run
//! use dealifi_core::{CandyMachineRecord, WalletAddress};
//! use dealifi_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/dealifi-db").unwrap();
//!
//! let merchant: WalletAddress = "11111111111111111111111111111111".parse().unwrap();
//! let candy_machine = WalletAddress::from_bytes([1; 32]);
//!
//! let outcome = store
//!     .save_candy_machine(&merchant, CandyMachineRecord::new(candy_machine, 100))
//!     .unwrap();
//! assert!(outcome.created);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use dealifi_core::{CandyItem, CandyMachineRecord, Merchant, MintedRecord, WalletAddress};

/// Result of saving a candy machine.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The merchant document after the save.
    pub merchant: Merchant,
    /// Whether the merchant document was created by this save.
    pub created: bool,
}

/// The storage trait defining all database operations.
///
/// Every mutating operation is atomic with respect to the others: a
/// concurrent `record_mint` never loses an increment.
pub trait Store: Send + Sync {
    /// List every merchant, ordered by address bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_merchants(&self) -> Result<Vec<Merchant>>;

    /// Get a merchant by wallet address.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_merchant(&self, address: &WalletAddress) -> Result<Option<Merchant>>;

    /// Upsert a merchant and add (or refresh) one of its candy machines.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CandyMachineOwned` if a different merchant already
    /// registered the candy machine.
    fn save_candy_machine(
        &self,
        merchant: &WalletAddress,
        candy_machine: CandyMachineRecord,
    ) -> Result<SaveOutcome>;

    /// Append config-line items to a merchant's candy machine.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the merchant or candy machine is unknown.
    fn append_items(
        &self,
        merchant: &WalletAddress,
        candy_machine: &WalletAddress,
        items: Vec<CandyItem>,
    ) -> Result<Merchant>;

    /// Record a mint against a candy machine, whichever merchant owns it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no merchant owns the candy machine.
    fn record_mint(&self, candy_machine: &WalletAddress, minted: MintedRecord) -> Result<Merchant>;

    /// Look up the merchant that owns a candy machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_merchant_by_candy_machine(
        &self,
        candy_machine: &WalletAddress,
    ) -> Result<Option<WalletAddress>>;
}
