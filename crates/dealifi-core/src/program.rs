//! Interface of the deployed Dealifi program.
//!
//! The program itself lives on chain; these types mirror its accounts, seeds
//! and string limits as plain data.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::WalletAddress;

/// Maximum merchant name length in bytes.
pub const MERCHANT_NAME_MAX: usize = 64;

/// Maximum deal name prefix length in bytes.
pub const NAME_PREFIX_MAX: usize = 64;

/// Maximum deal URI prefix length in bytes.
pub const URI_PREFIX_MAX: usize = 128;

/// PDA seed prefixes.
pub mod seeds {
    /// `["merchant", authority]`
    pub const MERCHANT: &[u8] = b"merchant";
    /// `["deal", merchant, candy_machine]`
    pub const DEAL: &[u8] = b"deal";
    /// `["sale", deal, mint]`
    pub const SALE: &[u8] = b"sale";
    /// `["user_claim", user, candy_machine]`
    pub const USER_CLAIM: &[u8] = b"user_claim";
}

/// Lifecycle of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    /// Not yet visible.
    Draft,
    /// Open for minting. New deals start here.
    Active,
    /// Temporarily closed.
    Paused,
    /// Closed for good.
    Ended,
}

impl DealStatus {
    /// Discriminant stored on chain.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Active => 1,
            Self::Paused => 2,
            Self::Ended => 3,
        }
    }
}

impl TryFrom<u8> for DealStatus {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Draft),
            1 => Ok(Self::Active),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Ended),
            other => Err(CoreError::UnknownDealStatus(other)),
        }
    }
}

/// `Merchant` program account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAccount {
    /// Signer that owns the merchant.
    pub authority: WalletAddress,
    /// Treasury wallet.
    pub treasury: WalletAddress,
    /// Display name.
    pub name: String,
    /// PDA bump.
    pub bump: u8,
}

/// `Deal` program account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealAccount {
    /// Owning merchant account.
    pub merchant: WalletAddress,
    /// Candy machine backing the deal.
    pub candy_machine: WalletAddress,
    /// Collection mint.
    pub collection_mint: WalletAddress,
    /// Shared prefix of NFT names.
    pub name_prefix: String,
    /// Shared prefix of NFT URIs.
    pub uri_prefix: String,
    /// Items in the candy machine.
    pub items_available: u64,
    /// Unix time the deal goes live.
    pub go_live_date: Option<i64>,
    /// Unix time the deal ends.
    pub end_date: Option<i64>,
    /// Price per NFT.
    pub price_lamports: u64,
    /// Wallet receiving payments.
    pub payout_wallet: WalletAddress,
    /// Merkle root of the allow list.
    pub allowlist_merkle_root: Option<[u8; 32]>,
    /// Raw status discriminant.
    pub status: u8,
    /// PDA bump.
    pub bump: u8,
}

impl DealAccount {
    /// Decoded status.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownDealStatus` for discriminants outside the enum.
    pub fn status(&self) -> Result<DealStatus> {
        DealStatus::try_from(self.status)
    }
}

/// `Sale` program account, one per recorded mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleAccount {
    /// Deal the sale belongs to.
    pub deal: WalletAddress,
    /// Minted NFT.
    pub mint: WalletAddress,
    /// Buyer wallet.
    pub buyer: WalletAddress,
    /// Price paid.
    pub price_lamports: u64,
    /// Unix time of the sale.
    pub ts: i64,
    /// PDA bump.
    pub bump: u8,
}

/// `UserClaim` program account tracking NFT staking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaim {
    /// Staking wallet.
    pub user: WalletAddress,
    /// Candy machine of the staked NFT.
    pub candy_machine: WalletAddress,
    /// Staked NFT.
    pub mint: WalletAddress,
    /// Whether the NFT is currently staked.
    pub is_staked: bool,
    /// Unix time of staking.
    pub staked_at: Option<i64>,
    /// Unix time of unstaking.
    pub unstaked_at: Option<i64>,
    /// PDA bump.
    pub bump: u8,
}
