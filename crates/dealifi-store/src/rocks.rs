//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use dealifi_core::{CandyItem, CandyMachineRecord, Merchant, MintedRecord, WalletAddress};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{SaveOutcome, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // Serializes read-modify-write cycles so updates are never lost.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Write a merchant document plus owner index entries for its candy machines.
    fn write_merchant(&self, merchant: &Merchant) -> Result<()> {
        let cf_merchants = self.cf(cf::MERCHANTS)?;
        let cf_owners = self.cf(cf::CANDY_MACHINE_OWNERS)?;

        let merchant_key = keys::merchant_key(&merchant.merchant_address);
        let value = Self::serialize(merchant)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_merchants, &merchant_key, &value);
        for candy_machine in &merchant.candy_machines {
            batch.put_cf(
                &cf_owners,
                keys::candy_machine_key(&candy_machine.address),
                &merchant_key,
            );
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    fn list_merchants(&self) -> Result<Vec<Merchant>> {
        let cf = self.cf(cf::MERCHANTS)?;

        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                Self::deserialize(&value)
            })
            .collect()
    }

    fn get_merchant(&self, address: &WalletAddress) -> Result<Option<Merchant>> {
        let cf = self.cf(cf::MERCHANTS)?;
        let key = keys::merchant_key(address);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn save_candy_machine(
        &self,
        merchant_address: &WalletAddress,
        candy_machine: CandyMachineRecord,
    ) -> Result<SaveOutcome> {
        let _guard = self.lock()?;

        if let Some(owner) = self.find_merchant_by_candy_machine(&candy_machine.address)? {
            if owner != *merchant_address {
                return Err(StoreError::CandyMachineOwned {
                    candy_machine: candy_machine.address,
                    owner,
                });
            }
        }

        let existing = self.get_merchant(merchant_address)?;
        let created = existing.is_none();
        let mut merchant = existing.unwrap_or_else(|| Merchant::new(*merchant_address));

        let appended = merchant.upsert_candy_machine(candy_machine);
        self.write_merchant(&merchant)?;

        tracing::debug!(
            merchant = %merchant_address,
            created,
            appended,
            "Saved candy machine"
        );

        Ok(SaveOutcome { merchant, created })
    }

    fn append_items(
        &self,
        merchant_address: &WalletAddress,
        candy_machine: &WalletAddress,
        items: Vec<CandyItem>,
    ) -> Result<Merchant> {
        let _guard = self.lock()?;

        let mut merchant = self
            .get_merchant(merchant_address)?
            .ok_or_else(|| StoreError::merchant_not_found(merchant_address))?;

        let count = items.len();
        merchant.append_items(candy_machine, items)?;
        self.write_merchant(&merchant)?;

        tracing::debug!(
            merchant = %merchant_address,
            candy_machine = %candy_machine,
            count,
            "Appended candy machine items"
        );

        Ok(merchant)
    }

    fn record_mint(&self, candy_machine: &WalletAddress, minted: MintedRecord) -> Result<Merchant> {
        let _guard = self.lock()?;

        let owner = self
            .find_merchant_by_candy_machine(candy_machine)?
            .ok_or_else(|| StoreError::candy_machine_not_found(candy_machine))?;

        let mut merchant = self
            .get_merchant(&owner)?
            .ok_or_else(|| StoreError::merchant_not_found(&owner))?;

        merchant.record_mint(candy_machine, minted)?;
        self.write_merchant(&merchant)?;

        Ok(merchant)
    }

    fn find_merchant_by_candy_machine(
        &self,
        candy_machine: &WalletAddress,
    ) -> Result<Option<WalletAddress>> {
        let cf = self.cf(cf::CANDY_MACHINE_OWNERS)?;
        let key = keys::candy_machine_key(candy_machine);

        let Some(value) = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        keys::decode_address(&value)
            .map(Some)
            .ok_or_else(|| StoreError::Serialization("corrupt candy machine owner index".into()))
    }
}
