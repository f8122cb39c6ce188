//! Merchant and candy machine records.
//!
//! These are display mirrors of on-chain state. The chain stays authoritative;
//! the records exist so the marketplace can list deals without hitting RPC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::WalletAddress;

/// A merchant and every candy machine they have launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    /// The merchant's wallet address. Unique across the store.
    pub merchant_address: WalletAddress,

    /// Candy machines owned by this merchant, in the order they were saved.
    #[serde(default)]
    pub candy_machines: Vec<CandyMachineRecord>,

    /// When the merchant was first seen.
    pub created_at: DateTime<Utc>,

    /// When any part of the record last changed.
    pub updated_at: DateTime<Utc>,
}

impl Merchant {
    /// Create a merchant with no candy machines.
    #[must_use]
    pub fn new(merchant_address: WalletAddress) -> Self {
        let now = Utc::now();
        Self {
            merchant_address,
            candy_machines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a candy machine by address.
    #[must_use]
    pub fn find_candy_machine(&self, address: &WalletAddress) -> Option<&CandyMachineRecord> {
        self.candy_machines.iter().find(|cm| cm.address == *address)
    }

    fn find_candy_machine_mut(
        &mut self,
        address: &WalletAddress,
    ) -> Result<&mut CandyMachineRecord> {
        self.candy_machines
            .iter_mut()
            .find(|cm| cm.address == *address)
            .ok_or(CoreError::CandyMachineNotFound { address: *address })
    }

    /// Add a candy machine, or refresh the existing entry with the same address.
    ///
    /// Returns `true` when a new entry was appended. Counters, items and minted
    /// records of an existing entry are never overwritten.
    pub fn upsert_candy_machine(&mut self, record: CandyMachineRecord) -> bool {
        let now = Utc::now();
        self.updated_at = now;

        if let Ok(existing) = self.find_candy_machine_mut(&record.address) {
            existing.refresh_from(record, now);
            return false;
        }

        self.candy_machines.push(record);
        true
    }

    /// Append config-line items to a candy machine.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::CandyMachineNotFound` if the merchant does not own it.
    pub fn append_items(
        &mut self,
        candy_machine: &WalletAddress,
        items: impl IntoIterator<Item = CandyItem>,
    ) -> Result<()> {
        let now = Utc::now();
        let record = self.find_candy_machine_mut(candy_machine)?;
        record.items.extend(items);
        record.updated_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Record a successful mint: bump `items_redeemed` by one and keep the receipt.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::CandyMachineNotFound` if the merchant does not own it.
    pub fn record_mint(&mut self, candy_machine: &WalletAddress, minted: MintedRecord) -> Result<()> {
        let record = self.find_candy_machine_mut(candy_machine)?;
        record.items_redeemed += 1;
        record.updated_at = Some(minted.minted_at);
        record.minted_records.push(minted);
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A candy machine launched by a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineRecord {
    /// On-chain address of the candy machine.
    pub address: WalletAddress,

    /// Total number of items the candy machine can mint.
    pub items_available: u64,

    /// Number of items minted so far.
    #[serde(default)]
    pub items_redeemed: u64,

    /// When the candy machine was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Display name of the deal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Collection symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Deal description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Config lines loaded into the candy machine.
    #[serde(default)]
    pub items: Vec<CandyItem>,

    /// Receipts for every mint recorded through the backend.
    #[serde(default)]
    pub minted_records: Vec<MintedRecord>,

    /// Sol payment guard price in lamports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_lamports: Option<u64>,

    /// Sol payment guard price in SOL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_sol: Option<f64>,

    /// Start date guard (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_start_date: Option<i64>,

    /// End date guard (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_end_date: Option<i64>,

    /// Sol payment destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_destination: Option<WalletAddress>,

    /// When the record was last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CandyMachineRecord {
    /// Create a record for a freshly created candy machine.
    #[must_use]
    pub fn new(address: WalletAddress, items_available: u64) -> Self {
        Self {
            address,
            items_available,
            items_redeemed: 0,
            created_at: Utc::now(),
            name: None,
            symbol: None,
            description: None,
            items: Vec::new(),
            minted_records: Vec::new(),
            price_lamports: None,
            price_sol: None,
            guard_start_date: None,
            guard_end_date: None,
            guard_destination: None,
            updated_at: None,
        }
    }

    /// Items still available to mint.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.items_available.saturating_sub(self.items_redeemed)
    }

    /// Whether every item has been minted.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.remaining() == 0
    }

    /// Copy descriptive fields from a re-saved record.
    fn refresh_from(&mut self, other: Self, now: DateTime<Utc>) {
        self.items_available = other.items_available;
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.symbol.is_some() {
            self.symbol = other.symbol;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
        if other.price_lamports.is_some() {
            self.price_lamports = other.price_lamports;
            self.price_sol = other.price_sol;
        }
        if other.guard_start_date.is_some() {
            self.guard_start_date = other.guard_start_date;
        }
        if other.guard_end_date.is_some() {
            self.guard_end_date = other.guard_end_date;
        }
        if other.guard_destination.is_some() {
            self.guard_destination = other.guard_destination;
        }
        self.updated_at = Some(now);
    }
}

/// A config line: the per-item name suffix and metadata URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandyItem {
    /// Item name (appended to the candy machine's name prefix).
    pub name: String,
    /// Off-chain metadata URI.
    pub uri: String,
}

impl CandyItem {
    /// Create a config line.
    #[must_use]
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }
}

/// Receipt for one NFT minted from a candy machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedRecord {
    /// Mint address of the new NFT.
    pub mint: WalletAddress,
    /// Wallet that paid for and received the mint.
    pub authority: WalletAddress,
    /// Metadata URI, when it could be read back after minting.
    #[serde(default)]
    pub uri: Option<String>,
    /// When the mint was recorded.
    pub minted_at: DateTime<Utc>,
}

impl MintedRecord {
    /// Create a receipt stamped with the current time.
    #[must_use]
    pub fn new(mint: WalletAddress, authority: WalletAddress, uri: Option<String>) -> Self {
        Self {
            mint,
            authority,
            uri,
            minted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> WalletAddress {
        WalletAddress::from_bytes([byte; 32])
    }

    #[test]
    fn upsert_appends_new_candy_machine() {
        let mut merchant = Merchant::new(address(1));
        assert!(merchant.upsert_candy_machine(CandyMachineRecord::new(address(2), 10)));
        assert!(merchant.upsert_candy_machine(CandyMachineRecord::new(address(3), 5)));
        assert_eq!(merchant.candy_machines.len(), 2);
    }

    #[test]
    fn upsert_same_address_does_not_duplicate() {
        let mut merchant = Merchant::new(address(1));
        merchant.upsert_candy_machine(CandyMachineRecord::new(address(2), 10));
        merchant
            .record_mint(&address(2), MintedRecord::new(address(9), address(8), None))
            .unwrap();

        let mut again = CandyMachineRecord::new(address(2), 10);
        again.name = Some("Coffee deal".into());
        assert!(!merchant.upsert_candy_machine(again));

        assert_eq!(merchant.candy_machines.len(), 1);
        let cm = &merchant.candy_machines[0];
        assert_eq!(cm.name.as_deref(), Some("Coffee deal"));
        assert_eq!(cm.items_redeemed, 1);
        assert_eq!(cm.minted_records.len(), 1);
    }

    #[test]
    fn append_items_requires_known_candy_machine() {
        let mut merchant = Merchant::new(address(1));
        let err = merchant
            .append_items(&address(2), vec![CandyItem::new("#1", "https://x/1")])
            .unwrap_err();
        assert_eq!(err, CoreError::CandyMachineNotFound { address: address(2) });
    }

    #[test]
    fn append_items_extends_in_order() {
        let mut merchant = Merchant::new(address(1));
        merchant.upsert_candy_machine(CandyMachineRecord::new(address(2), 3));
        merchant
            .append_items(&address(2), vec![CandyItem::new("1", "u1")])
            .unwrap();
        merchant
            .append_items(
                &address(2),
                vec![CandyItem::new("2", "u2"), CandyItem::new("3", "u3")],
            )
            .unwrap();

        let names: Vec<_> = merchant.candy_machines[0]
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, ["1", "2", "3"]);
    }

    #[test]
    fn record_mint_increments_once() {
        let mut merchant = Merchant::new(address(1));
        merchant.upsert_candy_machine(CandyMachineRecord::new(address(2), 3));

        merchant
            .record_mint(&address(2), MintedRecord::new(address(10), address(20), None))
            .unwrap();
        merchant
            .record_mint(
                &address(2),
                MintedRecord::new(address(11), address(20), Some("https://x/2".into())),
            )
            .unwrap();

        let cm = merchant.find_candy_machine(&address(2)).unwrap();
        assert_eq!(cm.items_redeemed, 2);
        assert_eq!(cm.minted_records.len(), 2);
        assert_eq!(cm.remaining(), 1);
    }

    #[test]
    fn remaining_never_underflows() {
        let mut cm = CandyMachineRecord::new(address(2), 1);
        cm.items_redeemed = 4;
        assert_eq!(cm.remaining(), 0);
        assert!(cm.is_sold_out());
    }

    #[test]
    fn json_uses_camel_case() {
        let mut merchant = Merchant::new(address(1));
        merchant.upsert_candy_machine(CandyMachineRecord::new(address(2), 3));
        let json = serde_json::to_value(&merchant).unwrap();

        assert!(json.get("merchantAddress").is_some());
        let cm = &json["candyMachines"][0];
        assert_eq!(cm["itemsAvailable"], 3);
        assert_eq!(cm["itemsRedeemed"], 0);
        assert!(cm.get("name").is_none());
    }

    #[test]
    fn candy_machine_defaults_when_deserializing() {
        let json = serde_json::json!({
            "address": address(2).to_string(),
            "itemsAvailable": 7,
            "name": "Pizza"
        });
        let cm: CandyMachineRecord = serde_json::from_value(json).unwrap();
        assert_eq!(cm.items_redeemed, 0);
        assert!(cm.items.is_empty());
        assert_eq!(cm.name.as_deref(), Some("Pizza"));
    }
}
