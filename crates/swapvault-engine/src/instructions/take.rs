//! Fulfill a trade: pay the maker, receive the vault, close both accounts.

use serde::{Deserialize, Serialize};
use swapvault_ledger::Transaction;
use swapvault_types::{Address, EngineConfig, Receipt, ReceiptType, Result};

use super::{check_source, ensure_destination, expect_asset, load_record};
use crate::{derivation::expect_address, vault::Vault};

/// Accounts for [`crate::EscrowEngine::take`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeAccounts {
    /// Signs, pays the requested asset, and pays rent for missing destinations.
    pub taker: Address,
    /// Must equal the maker stored on the record.
    pub maker: Address,
    pub record: Address,
    pub offered_mint: Address,
    pub requested_mint: Address,
    pub vault: Address,
    /// Taker's token account of `requested_mint`.
    pub taker_source: Address,
    /// Receives the vault balance. Created if missing.
    pub taker_destination: Address,
    /// Receives `requested_amount`. Created if missing.
    pub maker_destination: Address,
}

impl TakeAccounts {
    pub(crate) fn addresses(&self) -> [Address; 9] {
        [
            self.taker,
            self.maker,
            self.record,
            self.offered_mint,
            self.requested_mint,
            self.vault,
            self.taker_source,
            self.taker_destination,
            self.maker_destination,
        ]
    }
}

pub(crate) fn process_take(
    tx: &mut Transaction<'_>,
    config: &EngineConfig,
    accounts: &TakeAccounts,
) -> Result<Receipt> {
    let taker = accounts.taker;
    tx.require_signer(&taker)?;

    let record = accounts.record;
    let terms = load_record(tx, &record)?;
    expect_address("maker", &terms.maker, &accounts.maker)?;
    expect_asset(&record, &terms.offered_asset, &accounts.offered_mint)?;
    expect_asset(&record, &terms.requested_asset, &accounts.requested_mint)?;

    let vault = Vault::load(tx, config, &record, &terms, &accounts.vault)?;

    check_source(
        tx,
        &accounts.taker_source,
        &terms.requested_asset,
        &taker,
        terms.requested_amount,
    )?;
    ensure_destination(
        tx,
        "taker_destination",
        &taker,
        &taker,
        &terms.offered_asset,
        &accounts.taker_destination,
    )?;
    ensure_destination(
        tx,
        "maker_destination",
        &taker,
        &terms.maker,
        &terms.requested_asset,
        &accounts.maker_destination,
    )?;

    tx.transfer(
        &accounts.taker_source,
        &accounts.maker_destination,
        &taker,
        terms.requested_amount,
    )?;
    let released = vault.disburse_and_close(tx, &terms, &accounts.taker_destination, &terms.maker)?;
    tx.close_program_account(&record, &terms.maker)?;

    Ok(Receipt::new(
        ReceiptType::Taken,
        record,
        terms,
        released,
        Some(taker),
    ))
}
