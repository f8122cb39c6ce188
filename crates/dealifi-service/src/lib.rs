//! Dealifi HTTP API Service.
//!
//! This crate mirrors on-chain candy machine state into a local store so the
//! marketplace can render deals quickly. It provides:
//!
//! - Merchant listing and lookup
//! - Candy machine registration, config-line items and mint receipts
//! - Token metadata upload to decentralized storage
//!
//! The chain stays authoritative. Nothing here signs or submits transactions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod uploader;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use uploader::{HttpUploader, UploadError, Uploader};
