//! # swapvault-types
//!
//! Shared types, errors, and configuration for the **SwapVault** escrow engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`ReceiptId`]
//! - **Record layout**: [`CustodyRecord`] (the 121-byte escrow record)
//! - **Token substrate layouts**: [`TokenAccount`], [`Mint`]
//! - **Address derivation**: [`derivation::find_program_address`], [`derivation::create_program_address`]
//! - **Receipts**: [`Receipt`], [`ReceiptType`]
//! - **Configuration**: [`EngineConfig`], [`RentConfig`]
//! - **Errors**: [`EscrowError`] with `SV_ERR_` prefix codes, [`ErrorKind`]
//! - **Constants**: seeds, program labels, rent defaults
//! - **Test helpers** (`test-helpers` feature): [`Keypair`]

pub mod config;
pub mod constants;
pub mod derivation;
pub mod error;
pub mod ids;
#[cfg(any(test, feature = "test-helpers"))]
pub mod keypair;
pub mod receipt;
pub mod record;
pub mod token;

pub use config::*;
pub use error::*;
pub use ids::*;
#[cfg(any(test, feature = "test-helpers"))]
pub use keypair::Keypair;
pub use receipt::*;
pub use record::*;
pub use token::*;

// Constants and derivation are accessed via their module path
// (`swapvault_types::constants::ESCROW_SEED`), not re-exported.
