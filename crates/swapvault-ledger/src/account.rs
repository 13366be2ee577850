//! A single ledger account.

use serde::{Deserialize, Serialize};
use swapvault_types::{constants::SYSTEM_PROGRAM_ID, Address};

/// Lamports plus an owner-defined byte payload.
///
/// Only the `owner` program may rewrite `data`. Wallets are owned by the
/// system program and carry no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Balance funding this account's storage.
    pub lamports: u64,
    /// Program that owns the account.
    pub owner: Address,
    /// Owner-defined contents.
    pub data: Vec<u8>,
}

impl Account {
    /// A zero-initialized account of `space` bytes owned by `owner`.
    #[must_use]
    pub fn new(lamports: u64, owner: Address, space: usize) -> Self {
        Self {
            lamports,
            owner,
            data: vec![0u8; space],
        }
    }

    /// A plain wallet: system-owned, no data.
    #[must_use]
    pub fn wallet(lamports: u64) -> Self {
        Self::new(lamports, SYSTEM_PROGRAM_ID, 0)
    }

    #[must_use]
    pub fn is_owned_by(&self, program: &Address) -> bool {
        self.owner == *program
    }
}
