//! Seam to the on-chain candy machine programs.
//!
//! Building, signing and sending transactions belongs to the wallet and the
//! Metaplex SDK. `CandyMachineProgram` is the narrow interface the manager
//! drives; implementations wrap whatever SDK the host application uses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dealifi_core::{
    CandyItem, CandyMachineState, ConfigLineSettings, GuardSet, MintArgs, WalletAddress,
};

/// Transaction signature, base58.
pub type Signature = String;

/// Errors surfaced by a program implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// The account does not exist yet, or has not propagated to the RPC node.
    #[error("account not found: {0}")]
    AccountNotFound(WalletAddress),

    /// The transaction was rejected or failed on chain.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// Any other SDK failure.
    #[error("program error: {0}")]
    Other(String),
}

impl ProgramError {
    /// Whether retrying may help.
    #[must_use]
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound(_))
    }
}

/// Arguments for the collection NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionArgs {
    /// NFT name.
    pub name: String,
    /// NFT symbol.
    pub symbol: String,
    /// Metadata URI.
    pub uri: String,
    /// Royalty in basis points.
    pub seller_fee_basis_points: u16,
    /// Sole verified creator and update authority.
    pub creator: WalletAddress,
}

/// Arguments for a new candy machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandyMachineArgs {
    /// Collection the minted NFTs join.
    pub collection_mint: WalletAddress,
    /// Authority of the candy machine and the collection.
    pub authority: WalletAddress,
    /// Items to mint.
    pub items_available: u64,
    /// Royalty in basis points.
    pub seller_fee_basis_points: u16,
    /// Maximum edition supply.
    pub max_edition_supply: u64,
    /// Whether minted metadata stays mutable.
    pub is_mutable: bool,
    /// Config line layout.
    pub config_line_settings: ConfigLineSettings,
    /// Guards to attach, if any.
    pub guards: Option<GuardSet>,
}

/// Token metadata account fields the manager reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    /// Mint the metadata describes.
    pub mint: WalletAddress,
    /// On-chain name.
    pub name: String,
    /// On-chain symbol.
    pub symbol: String,
    /// Off-chain JSON URI.
    pub uri: String,
}

/// Everything `mint` needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    /// Candy machine to mint from.
    pub candy_machine: WalletAddress,
    /// Collection of the candy machine.
    pub collection_mint: WalletAddress,
    /// Update authority of the collection (the candy machine authority).
    pub collection_update_authority: WalletAddress,
    /// Paying and receiving wallet.
    pub buyer: WalletAddress,
    /// Guard arguments.
    pub args: MintArgs,
}

/// Result of a successful mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintOutcome {
    /// New NFT mint.
    pub mint: WalletAddress,
    /// Mint transaction signature.
    pub signature: Signature,
}

/// On-chain operations the candy machine manager needs.
#[async_trait]
pub trait CandyMachineProgram: Send + Sync {
    /// Wallet signing transactions.
    fn identity(&self) -> WalletAddress;

    /// Whether an account exists on chain.
    async fn account_exists(&self, address: &WalletAddress) -> Result<bool, ProgramError>;

    /// Create a sized collection NFT and return its mint.
    async fn create_collection(
        &self,
        args: CreateCollectionArgs,
    ) -> Result<WalletAddress, ProgramError>;

    /// Read the token metadata of a mint.
    async fn fetch_metadata(&self, mint: &WalletAddress) -> Result<TokenMetadata, ProgramError>;

    /// Create a candy machine (and its guard when guards are given).
    async fn create_candy_machine(
        &self,
        args: CreateCandyMachineArgs,
    ) -> Result<WalletAddress, ProgramError>;

    /// Write config lines starting at `index`.
    async fn add_config_lines(
        &self,
        candy_machine: &WalletAddress,
        index: u64,
        lines: Vec<CandyItem>,
    ) -> Result<Signature, ProgramError>;

    /// Read a candy machine account.
    async fn fetch_candy_machine(
        &self,
        candy_machine: &WalletAddress,
    ) -> Result<CandyMachineState, ProgramError>;

    /// Read the guard attached at `mint_authority`, if any.
    async fn fetch_candy_guard(
        &self,
        mint_authority: &WalletAddress,
    ) -> Result<Option<GuardSet>, ProgramError>;

    /// Mint one NFT.
    async fn mint(&self, request: MintRequest) -> Result<MintOutcome, ProgramError>;

    /// Replace the default guard group of a candy machine.
    async fn update_guards(
        &self,
        candy_machine: &WalletAddress,
        guards: GuardSet,
    ) -> Result<Signature, ProgramError>;
}
