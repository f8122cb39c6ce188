//! Solana JSON-RPC client.
//!
//! Only the read calls the marketplace needs to confirm that writes have
//! landed. Transactions are sent by the wallet SDK, never from here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dealifi_core::WalletAddress;

use crate::error::ClientError;
use crate::retry::{retry_if, RetryPolicy};

/// Commitment used for reads.
const COMMITMENT: &str = "confirmed";

/// Account as returned by `getAccountInfo`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Balance in lamports.
    pub lamports: u64,
    /// Owning program.
    pub owner: String,
    /// Whether the account holds a program.
    pub executable: bool,
    /// Raw data as `[payload, encoding]`.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Entry of `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    /// Slot the transaction was processed in.
    pub slot: u64,
    /// Confirmations, `None` once rooted.
    #[serde(default)]
    pub confirmations: Option<u64>,
    /// Transaction error, if it failed.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    /// `processed`, `confirmed` or `finalized`.
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    /// Whether the transaction succeeded and reached at least `confirmed`.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.err.is_none()
            && matches!(
                self.confirmation_status.as_deref(),
                Some("confirmed" | "finalized")
            )
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Value wrapped with the slot it was read at.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Solana JSON-RPC client.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a JSON-RPC call.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Rpc` if the node answers with an error object.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, ClientError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: RpcResponse<R> = response.json().await?;
        match (body.result, body.error) {
            (_, Some(error)) => Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ClientError::Rpc {
                code: 0,
                message: format!("{method}: response has neither result nor error"),
            }),
        }
    }

    /// Fetch an account, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_account_info(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<AccountInfo>, ClientError> {
        let params = serde_json::json!([
            address.to_string(),
            { "encoding": "base64", "commitment": COMMITMENT }
        ]);

        let response: WithContext<Option<AccountInfo>> =
            self.call("getAccountInfo", params).await?;
        Ok(response.value)
    }

    /// Whether an account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn account_exists(&self, address: &WalletAddress) -> Result<bool, ClientError> {
        Ok(self.get_account_info(address).await?.is_some())
    }

    /// Look up transaction statuses. Unknown signatures map to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> Result<Vec<Option<SignatureStatus>>, ClientError> {
        let params = serde_json::json!([
            signatures,
            { "searchTransactionHistory": true }
        ]);

        let response: WithContext<Vec<Option<SignatureStatus>>> =
            self.call("getSignatureStatuses", params).await?;
        Ok(response.value)
    }

    /// Poll until an account becomes visible.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AccountNotFound` if the account is still missing
    /// after the last attempt.
    pub async fn wait_for_account(
        &self,
        address: &WalletAddress,
        policy: RetryPolicy,
    ) -> Result<AccountInfo, ClientError> {
        retry_if(
            policy,
            move || async move {
                self.get_account_info(address)
                    .await?
                    .ok_or_else(|| ClientError::AccountNotFound {
                        address: address.to_string(),
                    })
            },
            ClientError::is_account_not_found,
        )
        .await
    }
}
