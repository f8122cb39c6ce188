//! Request and response types for the Dealifi backend.

use serde::{Deserialize, Serialize};

use dealifi_core::{CandyItem, CandyMachineRecord, Merchant, WalletAddress};

/// `GET /api/merchants` response.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantListResponse {
    /// Every known merchant.
    pub merchants: Vec<Merchant>,
}

/// Response carrying one merchant document.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantResponse {
    /// The merchant.
    pub merchant: Merchant,
}

/// `POST /api/candy-machines/save` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCandyMachineRequest {
    /// Merchant wallet.
    pub merchant_address: WalletAddress,
    /// Candy machine to register.
    pub candy_machine: CandyMachineRecord,
}

/// `POST /api/candy-machines/items` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveItemsRequest {
    /// Merchant wallet.
    pub merchant_address: WalletAddress,
    /// Candy machine owned by the merchant.
    pub candy_machine_address: WalletAddress,
    /// Config lines to append.
    pub items: Vec<CandyItem>,
}

/// `POST /api/candy-machines/minted` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMintRequest {
    /// Candy machine minted from.
    pub candy_machine_address: WalletAddress,
    /// New NFT mint.
    pub mint: WalletAddress,
    /// Buyer wallet.
    pub authority: WalletAddress,
    /// Metadata URI, if it could be read.
    pub uri: Option<String>,
}

/// Token metadata entered by a merchant.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetadataInput {
    /// Token name.
    pub name: String,
    /// Token description.
    pub description: String,
    /// Extra attributes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<serde_json::Value>,
}

/// `POST /api/create-uri` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUriRequest {
    /// `data:` URL or `http(s)` URL of the image.
    pub image_data: String,
    /// Merchant-entered metadata.
    pub metadata: MetadataInput,
}

/// `POST /api/create-uri` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUriResponse {
    /// Uploaded image URI.
    pub image_url: String,
    /// Image MIME type.
    pub image_type: String,
    /// Uploaded metadata URI.
    pub metadata_uri: String,
    /// The uploaded metadata document.
    pub metadata: serde_json::Value,
}

/// Error envelope returned by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
}
