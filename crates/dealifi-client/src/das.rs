//! Digital Asset Standard (DAS) indexing API.
//!
//! DAS is served over the same JSON-RPC transport as the Solana node, by RPC
//! providers that run an indexer. The tracker built on top of it lists the
//! collections and NFTs a merchant wallet holds and spots newly created ones.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use dealifi_core::WalletAddress;

use crate::error::ClientError;
use crate::rpc::RpcClient;

/// Interface of the NFTs minted by candy machine v3.
pub const PROGRAMMABLE_NFT: &str = "ProgrammableNonFungibleV1";

/// Page size used by the tracker.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Name markers of collection NFTs.
const COLLECTION_MARKERS: [&str; 2] = ["Collection", "Candy Machine"];

/// Indexed asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset id (the mint).
    pub id: String,
    /// Token interface, e.g. `ProgrammableNonFungibleV1`.
    pub interface: String,
    /// Off-chain content.
    #[serde(default)]
    pub content: AssetContent,
    /// Current owner.
    #[serde(default)]
    pub ownership: AssetOwnership,
    /// Group memberships, e.g. the collection.
    #[serde(default)]
    pub grouping: Vec<AssetGroup>,
    /// Royalty settings.
    #[serde(default)]
    pub royalty: Option<AssetRoyalty>,
    /// Edition supply.
    #[serde(default)]
    pub supply: Option<AssetSupply>,
    /// Indexing time, when the provider reports it.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Display name, if the metadata carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.content.metadata.name.as_deref()
    }

    /// Collection the asset belongs to.
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        self.grouping
            .iter()
            .find(|g| g.group_key == "collection")
            .map(|g| g.group_value.as_str())
    }

    fn is_programmable_nft(&self) -> bool {
        self.interface == PROGRAMMABLE_NFT
    }

    fn is_collection(&self) -> bool {
        self.is_programmable_nft()
            && self
                .name()
                .is_some_and(|name| COLLECTION_MARKERS.iter().any(|m| name.contains(m)))
    }
}

/// Off-chain content of an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetContent {
    /// Metadata JSON URI.
    #[serde(default)]
    pub json_uri: String,
    /// Parsed metadata fields.
    #[serde(default)]
    pub metadata: AssetMetadata,
}

/// Metadata fields of an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Name.
    #[serde(default)]
    pub name: Option<String>,
    /// Symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Ownership of an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetOwnership {
    /// Owner wallet.
    #[serde(default)]
    pub owner: String,
    /// Whether the asset is frozen.
    #[serde(default)]
    pub frozen: bool,
}

/// Group membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetGroup {
    /// Group kind, `collection` for collections.
    pub group_key: String,
    /// Group id.
    pub group_value: String,
}

/// Royalty settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRoyalty {
    /// Royalty in basis points.
    pub basis_points: u16,
}

/// Edition supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSupply {
    /// Maximum prints.
    #[serde(default)]
    pub print_max_supply: Option<u64>,
    /// Prints so far.
    #[serde(default)]
    pub print_current_supply: Option<u64>,
}

/// A page of assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetList {
    /// Items on this page.
    pub total: u32,
    /// Page size.
    pub limit: u32,
    /// Page number, starting at 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Assets.
    #[serde(default)]
    pub items: Vec<Asset>,
}

/// DAS API client.
#[derive(Debug, Clone)]
pub struct DasClient {
    rpc: RpcClient,
}

impl DasClient {
    /// Wrap an RPC client pointed at a DAS-enabled endpoint.
    #[must_use]
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Fetch one asset.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rpc` if the asset is unknown to the indexer.
    pub async fn get_asset(&self, id: &WalletAddress) -> Result<Asset, ClientError> {
        self.rpc
            .call("getAsset", json!({ "id": id.to_string() }))
            .await
    }

    /// List assets held by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_assets_by_owner(
        &self,
        owner: &WalletAddress,
        page: u32,
        limit: u32,
    ) -> Result<AssetList, ClientError> {
        self.rpc
            .call(
                "getAssetsByOwner",
                json!({ "ownerAddress": owner.to_string(), "page": page, "limit": limit }),
            )
            .await
    }

    /// List assets in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_assets_by_group(
        &self,
        collection: &WalletAddress,
        page: u32,
        limit: u32,
    ) -> Result<AssetList, ClientError> {
        self.rpc
            .call(
                "getAssetsByGroup",
                json!({
                    "groupKey": "collection",
                    "groupValue": collection.to_string(),
                    "page": page,
                    "limit": limit
                }),
            )
            .await
    }
}

/// Assets of an authority, split by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandyMachineAssets {
    /// Collection NFTs.
    pub collections: Vec<Asset>,
    /// Other programmable NFTs.
    pub nfts: Vec<Asset>,
    /// Distinct assets seen, of any interface.
    pub total_assets: usize,
}

impl CandyMachineAssets {
    /// Collections followed by NFTs.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.collections.iter().chain(&self.nfts)
    }
}

/// Assets present now but not in an earlier snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssets {
    /// New collections.
    pub new_collections: Vec<Asset>,
    /// New NFTs.
    pub new_nfts: Vec<Asset>,
}

impl NewAssets {
    /// Count of new assets.
    #[must_use]
    pub fn total_new(&self) -> usize {
        self.new_collections.len() + self.new_nfts.len()
    }
}

/// Split assets into collections and NFTs, keeping the first copy of each id.
#[must_use]
pub fn categorize(assets: Vec<Asset>) -> CandyMachineAssets {
    let mut seen = HashSet::new();
    let mut result = CandyMachineAssets::default();

    for asset in assets {
        if !seen.insert(asset.id.clone()) {
            continue;
        }
        if asset.is_collection() {
            result.collections.push(asset);
        } else if asset.is_programmable_nft() {
            result.nfts.push(asset);
        }
    }

    result.total_assets = seen.len();
    result
}

/// Assets created after `cutoff`, newest first. Undated assets are dropped.
#[must_use]
pub fn recent<'a>(
    assets: impl IntoIterator<Item = &'a Asset>,
    cutoff: DateTime<Utc>,
) -> Vec<Asset> {
    let mut recent: Vec<Asset> = assets
        .into_iter()
        .filter(|a| a.created_at.is_some_and(|t| t > cutoff))
        .cloned()
        .collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent
}

/// Assets in `current` whose id is absent from `before`.
#[must_use]
pub fn diff(before: &CandyMachineAssets, current: CandyMachineAssets) -> NewAssets {
    let known: HashSet<&str> = before.iter().map(|a| a.id.as_str()).collect();

    NewAssets {
        new_collections: current
            .collections
            .into_iter()
            .filter(|a| !known.contains(a.id.as_str()))
            .collect(),
        new_nfts: current
            .nfts
            .into_iter()
            .filter(|a| !known.contains(a.id.as_str()))
            .collect(),
    }
}

/// Watches the assets held by a merchant wallet.
#[derive(Debug, Clone)]
pub struct AssetTracker {
    das: DasClient,
    limit: u32,
}

impl AssetTracker {
    /// Create a tracker reading the first page of [`DEFAULT_PAGE_LIMIT`] assets.
    #[must_use]
    pub fn new(das: DasClient) -> Self {
        Self {
            das,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Override the page size.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Collections and NFTs held by `authority`.
    ///
    /// # Errors
    ///
    /// Returns an error if the DAS request fails.
    pub async fn assets_by_authority(
        &self,
        authority: &WalletAddress,
    ) -> Result<CandyMachineAssets, ClientError> {
        let page = self
            .das
            .get_assets_by_owner(authority, 1, self.limit)
            .await?;
        let assets = categorize(page.items);

        tracing::debug!(
            authority = %authority,
            collections = assets.collections.len(),
            nfts = assets.nfts.len(),
            total = assets.total_assets,
            "Fetched assets"
        );
        Ok(assets)
    }

    /// Assets of `authority` created within the last `hours`, newest first.
    ///
    /// # Errors
    ///
    /// - `ClientError::Configuration` if the window reaches outside the
    ///   representable time range.
    /// - Any error of the DAS request.
    pub async fn recent_assets(
        &self,
        authority: &WalletAddress,
        hours: i64,
    ) -> Result<Vec<Asset>, ClientError> {
        let cutoff = Duration::try_hours(hours)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                ClientError::Configuration(format!("recent window of {hours} hours is out of range"))
            })?;

        let assets = self.assets_by_authority(authority).await?;
        Ok(recent(assets.iter(), cutoff))
    }

    /// Assets of `authority` that were not in `before`.
    ///
    /// # Errors
    ///
    /// Returns an error if the DAS request fails.
    pub async fn track_new(
        &self,
        authority: &WalletAddress,
        before: &CandyMachineAssets,
    ) -> Result<NewAssets, ClientError> {
        let current = self.assets_by_authority(authority).await?;
        let new = diff(before, current);

        if new.total_new() > 0 {
            tracing::info!(authority = %authority, count = new.total_new(), "New assets detected");
        }
        Ok(new)
    }
}
