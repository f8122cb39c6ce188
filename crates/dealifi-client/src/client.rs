//! Dealifi backend HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use dealifi_core::{CandyItem, CandyMachineRecord, Merchant, WalletAddress};

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, CreateUriRequest, CreateUriResponse, MerchantListResponse,
    MerchantResponse, MetadataInput, RecordMintRequest, SaveCandyMachineRequest, SaveItemsRequest,
};

/// Dealifi backend API client.
///
/// Mirrors candy machine state into the backend store after on-chain
/// operations succeed.
#[derive(Debug, Clone)]
pub struct DealifiClient {
    client: Client,
    base_url: String,
}

impl DealifiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the backend (e.g., `"http://localhost:4000"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// List every merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_merchants(&self) -> Result<Vec<Merchant>, ClientError> {
        let url = format!("{}/api/merchants", self.base_url);

        let response = self.client.get(&url).send().await?;

        self.handle_response::<MerchantListResponse>(response)
            .await
            .map(|r| r.merchants)
    }

    /// Get a merchant, or `None` if the backend does not know it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_merchant(
        &self,
        merchant: &WalletAddress,
    ) -> Result<Option<Merchant>, ClientError> {
        let url = format!("{}/api/merchants/{merchant}", self.base_url);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.handle_response::<MerchantResponse>(response)
            .await
            .map(|r| Some(r.merchant))
    }

    /// Register a candy machine under a merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn save_candy_machine(
        &self,
        merchant: WalletAddress,
        candy_machine: CandyMachineRecord,
    ) -> Result<Merchant, ClientError> {
        let url = format!("{}/api/candy-machines/save", self.base_url);
        let request = SaveCandyMachineRequest {
            merchant_address: merchant,
            candy_machine,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response::<MerchantResponse>(response)
            .await
            .map(|r| r.merchant)
    }

    /// Append config-line items to a candy machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn save_candy_machine_items(
        &self,
        merchant: WalletAddress,
        candy_machine: WalletAddress,
        items: Vec<CandyItem>,
    ) -> Result<Merchant, ClientError> {
        let url = format!("{}/api/candy-machines/items", self.base_url);
        let request = SaveItemsRequest {
            merchant_address: merchant,
            candy_machine_address: candy_machine,
            items,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response::<MerchantResponse>(response)
            .await
            .map(|r| r.merchant)
    }

    /// Record a mint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn record_mint(&self, request: RecordMintRequest) -> Result<Merchant, ClientError> {
        let url = format!("{}/api/candy-machines/minted", self.base_url);

        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response::<MerchantResponse>(response)
            .await
            .map(|r| r.merchant)
    }

    /// Upload an image and its token metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_uri(
        &self,
        image_data: impl Into<String>,
        metadata: MetadataInput,
    ) -> Result<CreateUriResponse, ClientError> {
        let url = format!("{}/api/create-uri", self.base_url);
        let request = CreateUriRequest {
            image_data: image_data.into(),
            metadata,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        match response.json::<ApiErrorResponse>().await {
            Ok(api_error) => Err(ClientError::Api {
                code: api_error.error.code,
                message: api_error.error.message,
                status: status.as_u16(),
            }),
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
