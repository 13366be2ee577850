//! # swapvault-engine
//!
//! The escrow state machine.
//!
//! A maker locks `offered_amount` of one asset in a vault and names the
//! `requested_amount` of another asset it wants back. A taker either fulfills
//! the trade in one atomic step, or the maker cancels and reclaims the vault.
//!
//! ## Architecture
//!
//! 1. **Derivation**: `(maker, nonce)` → record address; `(record, asset)` → vault address
//! 2. **Vault**: token account whose only authority is the record's derived address
//! 3. **Instructions**: account sets plus scalar arguments for `make`, `take`, `refund`
//! 4. **EscrowEngine**: deploys the escrow program on a ledger, holds its only [`swapvault_ledger::ProgramKey`], and runs each transition in one ledger transaction
//!
//! ## Lifecycle
//!
//! ```text
//!   ┌───┐   make   ┌──────┐   take   ┌───┐
//!   │ ∅ ├─────────▶│ OPEN ├─────────▶│ ∅ │
//!   └───┘          └──┬───┘          └───┘
//!                     │ refund
//!                     ▼
//!                   ┌───┐
//!                   │ ∅ │
//!                   └───┘
//! ```
//!
//! Every transition commits all of its effects or none of them, and returns
//! a [`swapvault_types::Receipt`].

pub mod derivation;
pub mod engine;
pub mod instructions;
pub(crate) mod vault;

pub use engine::EscrowEngine;
pub use instructions::{
    Instruction, MakeAccounts, MakeArgs, RefundAccounts, TakeAccounts,
};
