//! Candy machine configuration, guards and on-chain state snapshots.
//!
//! Transactions are built by the Metaplex SDK; this module holds the rules the
//! marketplace applies around them: config-line sizing, guard resolution,
//! mint preflight checks and status/health reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::WalletAddress;

/// Maximum on-chain length of a config line name, prefix included.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum on-chain length of a config line URI, prefix included.
pub const MAX_URI_LENGTH: usize = 200;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Seller fee applied to collections and candy machines (5%).
pub const DEFAULT_SELLER_FEE_BASIS_POINTS: u16 = 500;

/// Values of `items_redeemed` above this are treated as a corrupted read.
pub const MAX_SANE_ITEMS_REDEEMED: u64 = 1_000_000;

/// Convert lamports to SOL.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

// ============================================================================
// Configuration
// ============================================================================

/// Parameters for a new candy machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineConfig {
    /// Number of NFTs the candy machine will mint.
    pub items_available: u64,
    /// Collection symbol; also used to build the name prefix.
    pub symbol: String,
    /// Royalty in basis points.
    #[serde(default = "default_seller_fee")]
    pub seller_fee_basis_points: u16,
    /// Maximum edition supply per NFT.
    #[serde(default)]
    pub max_supply: u64,
    /// Whether minted metadata can be updated later.
    #[serde(default = "default_true")]
    pub is_mutable: bool,
}

fn default_seller_fee() -> u16 {
    DEFAULT_SELLER_FEE_BASIS_POINTS
}

fn default_true() -> bool {
    true
}

impl CandyMachineConfig {
    /// Create a config with default royalties.
    #[must_use]
    pub fn new(symbol: impl Into<String>, items_available: u64) -> Self {
        Self {
            items_available,
            symbol: symbol.into(),
            seller_fee_basis_points: DEFAULT_SELLER_FEE_BASIS_POINTS,
            max_supply: 0,
            is_mutable: true,
        }
    }

    /// Name of the collection NFT created alongside the candy machine.
    #[must_use]
    pub fn collection_name(&self) -> String {
        format!("{} Collection", self.symbol)
    }

    /// Derive config line settings from the symbol.
    ///
    /// Names are stored as `"{symbol} #"` plus a per-item suffix, and URIs are
    /// stored whole.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NameTooLong` if the name prefix alone exceeds
    /// [`MAX_NAME_LENGTH`].
    pub fn config_line_settings(&self) -> Result<ConfigLineSettings> {
        ConfigLineSettings::new(format!("{} #", self.symbol), String::new())
    }
}

/// How config lines are laid out inside the candy machine account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLineSettings {
    /// Shared prefix of every item name.
    pub prefix_name: String,
    /// Bytes reserved for each name suffix.
    pub name_length: u32,
    /// Shared prefix of every item URI.
    pub prefix_uri: String,
    /// Bytes reserved for each URI suffix.
    pub uri_length: u32,
    /// Mint items in load order instead of pseudo-randomly.
    pub is_sequential: bool,
}

impl ConfigLineSettings {
    /// Build settings, reserving whatever the prefixes leave of the limits.
    ///
    /// # Errors
    ///
    /// Returns `NameTooLong` or `UriTooLong` when a prefix does not fit.
    pub fn new(prefix_name: String, prefix_uri: String) -> Result<Self> {
        if prefix_name.len() > MAX_NAME_LENGTH {
            return Err(CoreError::NameTooLong {
                prefix: prefix_name,
                max: MAX_NAME_LENGTH,
            });
        }
        if prefix_uri.len() > MAX_URI_LENGTH {
            return Err(CoreError::UriTooLong {
                prefix: prefix_uri,
                max: MAX_URI_LENGTH,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let name_length = (MAX_NAME_LENGTH - prefix_name.len()) as u32;
        #[allow(clippy::cast_possible_truncation)]
        let uri_length = (MAX_URI_LENGTH - prefix_uri.len()) as u32;

        Ok(Self {
            prefix_name,
            name_length,
            prefix_uri,
            uri_length,
            is_sequential: false,
        })
    }

    /// Check that an item fits the reserved suffix lengths.
    #[must_use]
    pub fn fits(&self, name: &str, uri: &str) -> bool {
        name.len() <= self.name_length as usize && uri.len() <= self.uri_length as usize
    }
}

// ============================================================================
// Guards
// ============================================================================

/// Guard settings as entered by a merchant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardConfig {
    /// Charge SOL per mint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sol_payment: Option<SolPaymentConfig>,
    /// Per-wallet mint limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint_limit: Option<MintLimit>,
    /// Minting opens at this unix time (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    /// Minting closes at this unix time (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    /// Wallets allowed to mint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_list: Vec<WalletAddress>,
}

/// Sol payment guard input. The destination falls back to the creator wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolPaymentConfig {
    /// Price in lamports.
    pub lamports: u64,
    /// Where payments go.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<WalletAddress>,
}

/// Mint limit guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintLimit {
    /// Guard instance id.
    pub id: u8,
    /// Mints allowed per wallet.
    pub limit: u16,
}

/// Guards ready to submit on chain.
///
/// Only sol payment and the date guards are forwarded; mint limits and allow
/// lists are accepted in [`GuardConfig`] but not wired to the guard program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardSet {
    /// Sol payment guard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sol_payment: Option<SolPayment>,
    /// Start date guard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// End date guard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Resolved sol payment guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolPayment {
    /// Price in lamports.
    pub lamports: u64,
    /// Payment destination.
    pub destination: WalletAddress,
}

impl GuardConfig {
    /// Resolve merchant input into a guard set.
    ///
    /// Returns `None` when no forwarded guard is configured.
    #[must_use]
    pub fn resolve(&self, identity: WalletAddress) -> Option<GuardSet> {
        let sol_payment = self.sol_payment.as_ref().map(|payment| SolPayment {
            lamports: payment.lamports,
            destination: payment.destination.unwrap_or(identity),
        });

        // A zero timestamp is the form's "unset"
        let start_date = self
            .start_date
            .filter(|ts| *ts != 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0));
        let end_date = self
            .end_date
            .filter(|ts| *ts != 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        let set = GuardSet {
            sol_payment,
            start_date,
            end_date,
        };

        (!set.is_empty()).then_some(set)
    }
}

impl GuardSet {
    /// Whether no guard is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sol_payment.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Names of the configured guards.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.sol_payment.is_some() {
            names.push("solPayment");
        }
        if self.start_date.is_some() {
            names.push("startDate");
        }
        if self.end_date.is_some() {
            names.push("endDate");
        }
        names
    }

    /// Mint arguments the buyer must supply for these guards.
    #[must_use]
    pub fn mint_args(&self) -> MintArgs {
        MintArgs {
            sol_payment_destination: self.sol_payment.map(|p| p.destination),
        }
    }

    /// Whether minting is open at `now` according to the date guards.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| now >= start)
            && self.end_date.map_or(true, |end| now < end)
    }
}

/// Buyer-side arguments for `mint`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintArgs {
    /// Destination passed to the sol payment guard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sol_payment_destination: Option<WalletAddress>,
}

// ============================================================================
// On-chain state
// ============================================================================

/// Snapshot of a candy machine account as read from chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineState {
    /// Candy machine address.
    pub address: WalletAddress,
    /// Authority allowed to update the candy machine.
    pub authority: WalletAddress,
    /// Mint authority (the candy guard account when guards are attached).
    pub mint_authority: WalletAddress,
    /// Collection every mint is verified into.
    pub collection_mint: WalletAddress,
    /// Items the candy machine was created with.
    pub items_available: u64,
    /// Items minted so far, as stored on chain.
    pub items_redeemed: u64,
    /// Config lines loaded so far.
    pub items_loaded: u64,
    /// Whether minted metadata stays mutable.
    pub is_mutable: bool,
    /// Maximum edition supply.
    pub max_edition_supply: u64,
}

impl CandyMachineState {
    /// `items_redeemed`, or zero when the read is implausible.
    #[must_use]
    pub fn sanitized_items_redeemed(&self) -> u64 {
        if self.items_redeemed > MAX_SANE_ITEMS_REDEEMED {
            0
        } else {
            self.items_redeemed
        }
    }

    /// Items left to mint.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.items_available
            .saturating_sub(self.sanitized_items_redeemed())
    }

    /// Whether every config line is loaded.
    #[must_use]
    pub fn is_fully_loaded(&self) -> bool {
        self.items_loaded >= self.items_available
    }

    /// Check the candy machine can serve the next mint.
    ///
    /// # Errors
    ///
    /// - `CandyMachineEmpty` if every item is redeemed.
    /// - `NoItemsLoaded` if no config line is loaded.
    /// - `NotEnoughItemsLoaded` if the next item is not loaded yet.
    /// - `NotFullyLoaded` if loading is incomplete; candy machine v3 refuses
    ///   to mint until every config line is present.
    pub fn check_mintable(&self) -> Result<()> {
        let redeemed = self.sanitized_items_redeemed();
        if redeemed >= self.items_available {
            return Err(CoreError::CandyMachineEmpty);
        }
        if self.items_loaded == 0 {
            return Err(CoreError::NoItemsLoaded);
        }
        if self.items_loaded < redeemed + 1 {
            return Err(CoreError::NotEnoughItemsLoaded {
                loaded: self.items_loaded,
                required: redeemed + 1,
            });
        }
        if self.items_loaded != self.items_available {
            return Err(CoreError::NotFullyLoaded {
                loaded: self.items_loaded,
                available: self.items_available,
            });
        }
        Ok(())
    }

    /// Summarize the candy machine for display.
    #[must_use]
    pub fn status(&self, guards: Option<&GuardSet>) -> CandyMachineStatus {
        let remaining = self.remaining();
        CandyMachineStatus {
            items_available: self.items_available,
            items_redeemed: self.sanitized_items_redeemed(),
            items_loaded: self.items_loaded,
            remaining,
            is_active: remaining > 0,
            guards: guards.cloned(),
        }
    }

    /// Diagnose common configuration problems.
    #[must_use]
    pub fn health(
        &self,
        guards: Option<&GuardSet>,
        current_wallet: Option<WalletAddress>,
    ) -> CandyMachineHealth {
        let remaining = self.remaining();
        let has_items = self.items_loaded > 0;
        let has_guards = guards.is_some();

        let mut issues = Vec::new();
        if !has_items {
            issues.push("No items loaded - candy machine needs items to be added".to_string());
        }
        if remaining == 0 {
            issues.push("No remaining items to mint".to_string());
        }
        if !has_guards {
            issues.push("No guards configured - may cause minting issues".to_string());
        }

        CandyMachineHealth {
            items_available: self.items_available,
            items_redeemed: self.sanitized_items_redeemed(),
            items_loaded: self.items_loaded,
            remaining,
            has_items,
            has_guards,
            guards: guards
                .map(|g| g.names().into_iter().map(String::from).collect())
                .unwrap_or_default(),
            authority: self.authority,
            current_wallet,
            issues,
        }
    }
}

/// Display summary of a candy machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineStatus {
    /// Items the candy machine was created with.
    pub items_available: u64,
    /// Items minted so far.
    pub items_redeemed: u64,
    /// Config lines loaded.
    pub items_loaded: u64,
    /// Items left to mint.
    pub remaining: u64,
    /// Whether items remain.
    pub is_active: bool,
    /// Guards attached to the candy machine.
    pub guards: Option<GuardSet>,
}

/// Health report for a candy machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineHealth {
    /// Items the candy machine was created with.
    pub items_available: u64,
    /// Items minted so far.
    pub items_redeemed: u64,
    /// Config lines loaded.
    pub items_loaded: u64,
    /// Items left to mint.
    pub remaining: u64,
    /// Whether any config line is loaded.
    pub has_items: bool,
    /// Whether a candy guard is attached.
    pub has_guards: bool,
    /// Names of the configured guards.
    pub guards: Vec<String>,
    /// Candy machine authority.
    pub authority: WalletAddress,
    /// Wallet that ran the check.
    pub current_wallet: Option<WalletAddress>,
    /// Human-readable problems found.
    pub issues: Vec<String>,
}

impl CandyMachineHealth {
    /// Whether no issue was found.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}
