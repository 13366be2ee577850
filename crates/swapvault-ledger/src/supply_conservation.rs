//! Supply conservation invariant checker.
//!
//! Invariants enforced before every transaction commits:
//! ```text
//! Σ lamports(all accounts)            == Σ lamports at transaction start
//! ∀ touched mint: Σ amount(token accts) == mint.supply
//! ```
//!
//! Escrow transitions only move value between accounts, so neither sum may
//! change. A violation aborts the transaction.

use std::collections::BTreeSet;

use swapvault_types::{Address, EscrowError, Result};

use crate::Ledger;

/// Snapshot of conserved quantities taken when a transaction begins.
#[derive(Debug, Clone)]
pub struct SupplyConservation {
    /// Total lamports across the ledger at transaction start.
    lamports_before: u128,
    /// Mints whose token accounts the transaction touched.
    touched_mints: BTreeSet<Address>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new(lamports_before: u128) -> Self {
        Self {
            lamports_before,
            touched_mints: BTreeSet::new(),
        }
    }

    /// Record that a token account of `mint` was written.
    pub fn track_mint(&mut self, mint: Address) {
        self.touched_mints.insert(mint);
    }

    /// Mints recorded so far.
    pub fn tracked_mints(&self) -> impl Iterator<Item = &Address> {
        self.touched_mints.iter()
    }

    /// Verify both invariants against the ledger's current state.
    ///
    /// # Errors
    /// Returns [`EscrowError::SupplyInvariantViolation`] if either sum drifted.
    pub fn verify(&self, ledger: &Ledger) -> Result<()> {
        let lamports_after = ledger.total_lamports();
        if lamports_after != self.lamports_before {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "lamports: {lamports_after} after != {} before",
                    self.lamports_before
                ),
            });
        }

        for mint in &self.touched_mints {
            let supply = ledger.mint(mint)?.supply;
            let held = ledger.circulating(mint);
            if held != u128::from(supply) {
                return Err(EscrowError::SupplyInvariantViolation {
                    reason: format!("mint {mint}: token accounts hold {held}, supply is {supply}"),
                });
            }
        }
        Ok(())
    }
}
