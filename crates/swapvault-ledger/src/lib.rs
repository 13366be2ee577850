//! # swapvault-ledger
//!
//! The account substrate the escrow engine runs against.
//!
//! ## Architecture
//!
//! 1. **Ledger**: address → [`Account`] store; `&mut` access serializes writers
//! 2. **Transaction**: undo-log unit of work; every effect commits together or none do
//! 3. **Signers**: ed25519-verified set of identities authorizing a transaction
//! 4. **Token operations**: mint/token-account checks, transfers, closes
//! 5. **SupplyConservation**: lamport and per-mint supply checked before commit
//! 6. **ProgramKey**: the right to run transactions as one program, issued once per id
//!
//! ## Transaction Flow
//!
//! ```text
//! Ledger.transact(&program_key, signers, |tx| { ... })
//!     → effects recorded against undo log
//!     → SupplyConservation.verify()
//!     → commit (drop undo log)  |  rollback (restore every snapshot)
//! ```
//!
//! Provisioning (`create_wallet`, `create_mint`, `mint_to`, ...) writes
//! directly outside any transaction. It stands in for the external systems
//! that fund wallets and issue assets; hosts and tests use it, the engine
//! never does.

pub mod account;
pub mod genesis;
pub mod ledger;
pub mod program;
pub mod signers;
pub mod supply_conservation;
pub mod transaction;

pub use account::Account;
pub use ledger::Ledger;
pub use program::ProgramKey;
pub use signers::Signers;
pub use supply_conservation::SupplyConservation;
pub use transaction::Transaction;
