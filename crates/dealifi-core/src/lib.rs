//! Core types for the Dealifi marketplace.
//!
//! Dealifi sells deals as NFTs minted from Metaplex candy machines. This crate
//! holds the types shared by the backend service and the client SDK:
//!
//! - **Addresses**: `WalletAddress`
//! - **Mirror records**: `Merchant`, `CandyMachineRecord`, `CandyItem`, `MintedRecord`
//! - **Candy machines**: `CandyMachineConfig`, `GuardConfig`, `CandyMachineState`
//! - **Program interface**: account and instruction shapes of the on-chain program
//!
//! The chain is the source of truth. Mirror records are a display cache and
//! may lag behind it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod address;
pub mod candy_machine;
pub mod error;
pub mod merchant;
pub mod program;

pub use address::{AddressError, WalletAddress, ADDRESS_LEN};
pub use candy_machine::{
    lamports_to_sol, CandyMachineConfig, CandyMachineHealth, CandyMachineState,
    CandyMachineStatus, ConfigLineSettings, GuardConfig, GuardSet, MintArgs, MintLimit,
    SolPayment, SolPaymentConfig, LAMPORTS_PER_SOL, MAX_NAME_LENGTH, MAX_URI_LENGTH,
};
pub use error::{CoreError, Result};
pub use merchant::{CandyItem, CandyMachineRecord, Merchant, MintedRecord};
pub use program::DealStatus;
