//! Merchant read handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use dealifi_core::Merchant;
use dealifi_store::Store;

use super::parse_address;
use crate::error::ApiError;
use crate::state::AppState;

/// Merchant list response.
#[derive(Debug, Serialize)]
pub struct MerchantListResponse {
    /// Always `true`.
    pub success: bool,
    /// Every known merchant.
    pub merchants: Vec<Merchant>,
}

/// Single merchant response.
#[derive(Debug, Serialize)]
pub struct MerchantResponse {
    /// Always `true`.
    pub success: bool,
    /// The merchant document.
    pub merchant: Merchant,
}

impl From<Merchant> for MerchantResponse {
    fn from(merchant: Merchant) -> Self {
        Self {
            success: true,
            merchant,
        }
    }
}

/// List all merchants.
pub async fn list_merchants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MerchantListResponse>, ApiError> {
    let merchants = state.store.list_merchants()?;

    Ok(Json(MerchantListResponse {
        success: true,
        merchants,
    }))
}

/// Get a merchant by wallet address.
pub async fn get_merchant(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<MerchantResponse>, ApiError> {
    let address = parse_address("merchant address", &address)?;

    let merchant = state
        .store
        .get_merchant(&address)?
        .ok_or_else(|| ApiError::NotFound("Merchant not found".into()))?;

    Ok(Json(merchant.into()))
}
