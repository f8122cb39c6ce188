//! Candy machine mirror handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use dealifi_core::{CandyItem, CandyMachineRecord, MintedRecord, WalletAddress};
use dealifi_store::Store;

use super::merchants::MerchantResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Save candy machine request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCandyMachineRequest {
    /// Merchant wallet.
    pub merchant_address: WalletAddress,
    /// Candy machine to add to the merchant.
    pub candy_machine: CandyMachineRecord,
}

/// Append items request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveItemsRequest {
    /// Merchant wallet.
    pub merchant_address: WalletAddress,
    /// Candy machine owned by the merchant.
    pub candy_machine_address: WalletAddress,
    /// Config lines to append.
    pub items: Vec<CandyItem>,
}

/// Record mint request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMintRequest {
    /// Candy machine the NFT was minted from.
    pub candy_machine_address: WalletAddress,
    /// New NFT mint.
    pub mint: WalletAddress,
    /// Buyer wallet.
    pub authority: WalletAddress,
    /// Metadata URI, if known.
    #[serde(default)]
    pub uri: Option<String>,
}

/// Register a candy machine under a merchant, creating the merchant on first use.
///
/// Responds 201 when the merchant document was created and 200 otherwise.
pub async fn save_candy_machine(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveCandyMachineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MerchantResponse>), ApiError> {
    let Json(request) = payload?;
    let candy_machine = request.candy_machine.address;

    let outcome = state
        .store
        .save_candy_machine(&request.merchant_address, request.candy_machine)?;

    tracing::info!(
        merchant = %request.merchant_address,
        candy_machine = %candy_machine,
        created = outcome.created,
        "Candy machine saved"
    );

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(outcome.merchant.into())))
}

/// Append config-line items to a merchant's candy machine.
pub async fn save_candy_machine_items(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveItemsRequest>, JsonRejection>,
) -> Result<Json<MerchantResponse>, ApiError> {
    let Json(request) = payload?;
    let count = request.items.len();

    let merchant = state
        .store
        .append_items(
            &request.merchant_address,
            &request.candy_machine_address,
            request.items,
        )
        .map_err(|e| match e {
            dealifi_store::StoreError::NotFound { .. } => {
                ApiError::NotFound("Candy machine not found under merchant".into())
            }
            other => other.into(),
        })?;

    tracing::info!(
        merchant = %request.merchant_address,
        candy_machine = %request.candy_machine_address,
        count,
        "Candy machine items saved"
    );

    Ok(Json(merchant.into()))
}

/// Record a mint: bump `itemsRedeemed` and keep the receipt.
pub async fn record_mint(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecordMintRequest>, JsonRejection>,
) -> Result<Json<MerchantResponse>, ApiError> {
    let Json(request) = payload?;
    let uri = request.uri.filter(|uri| !uri.is_empty());

    let merchant = state
        .store
        .record_mint(
            &request.candy_machine_address,
            MintedRecord::new(request.mint, request.authority, uri),
        )
        .map_err(|e| match e {
            dealifi_store::StoreError::NotFound { .. } => {
                ApiError::NotFound("Candy machine not found".into())
            }
            other => other.into(),
        })?;

    tracing::info!(
        candy_machine = %request.candy_machine_address,
        mint = %request.mint,
        authority = %request.authority,
        "Mint recorded"
    );

    Ok(Json(merchant.into()))
}
