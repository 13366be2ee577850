//! Cancel a trade: return the vault to the maker and close both accounts.

use serde::{Deserialize, Serialize};
use swapvault_ledger::Transaction;
use swapvault_types::{Address, EngineConfig, EscrowError, Receipt, ReceiptType, Result};

use super::{ensure_destination, expect_asset, load_record};
use crate::vault::Vault;

/// Accounts for [`crate::EscrowEngine::refund`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundAccounts {
    /// Signs; must be the maker stored on the record.
    pub maker: Address,
    pub record: Address,
    pub offered_mint: Address,
    pub vault: Address,
    /// Receives the vault balance. Created if missing, paid by the maker.
    pub maker_destination: Address,
}

impl RefundAccounts {
    pub(crate) fn addresses(&self) -> [Address; 5] {
        [
            self.maker,
            self.record,
            self.offered_mint,
            self.vault,
            self.maker_destination,
        ]
    }
}

pub(crate) fn process_refund(
    tx: &mut Transaction<'_>,
    config: &EngineConfig,
    accounts: &RefundAccounts,
) -> Result<Receipt> {
    let signer = accounts.maker;
    tx.require_signer(&signer)?;

    let record = accounts.record;
    let terms = load_record(tx, &record)?;
    if terms.maker != signer {
        return Err(EscrowError::Unauthorized {
            expected: terms.maker,
            actual: signer,
        });
    }
    expect_asset(&record, &terms.offered_asset, &accounts.offered_mint)?;

    let vault = Vault::load(tx, config, &record, &terms, &accounts.vault)?;
    ensure_destination(
        tx,
        "maker_destination",
        &signer,
        &signer,
        &terms.offered_asset,
        &accounts.maker_destination,
    )?;

    let released =
        vault.disburse_and_close(tx, &terms, &accounts.maker_destination, &terms.maker)?;
    tx.close_program_account(&record, &terms.maker)?;

    Ok(Receipt::new(
        ReceiptType::Refunded,
        record,
        terms,
        released,
        None,
    ))
}
