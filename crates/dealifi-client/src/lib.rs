//! Client SDK for Dealifi.
//!
//! - [`DealifiClient`]: REST client for the mirror backend
//! - [`RpcClient`]: Solana JSON-RPC reads
//! - [`DasClient`] and [`AssetTracker`]: DAS indexer queries
//! - [`CandyMachineManager`]: create, load and mint from candy machines over
//!   any [`CandyMachineProgram`] implementation
//!
//! # Example
//!
//! ```no_run
//! use dealifi_client::DealifiClient;
//!
//! # async fn example() -> Result<(), dealifi_client::ClientError> {
//! let client = DealifiClient::new("http://localhost:4000")?;
//!
//! for merchant in client.list_merchants().await? {
//!     println!("{} has {} candy machines", merchant.merchant_address, merchant.candy_machines.len());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
pub mod das;
mod error;
pub mod manager;
pub mod program;
pub mod retry;
pub mod rpc;
mod types;

pub use client::{ClientOptions, DealifiClient};
pub use das::{AssetTracker, DasClient};
pub use error::ClientError;
pub use manager::{CandyMachineManager, CreatedCandyMachine};
pub use program::{CandyMachineProgram, ProgramError};
pub use retry::RetryPolicy;
pub use rpc::RpcClient;
pub use types::*;

// Re-export core types for convenience
pub use dealifi_core::{
    CandyItem, CandyMachineConfig, CandyMachineRecord, GuardConfig, Merchant, MintedRecord,
    WalletAddress,
};
