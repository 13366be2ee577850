//! Open a trade: create the custody record and fund its vault.

use serde::{Deserialize, Serialize};
use swapvault_ledger::Transaction;
use swapvault_types::{
    Address, CustodyRecord, EngineConfig, EscrowError, Receipt, ReceiptType, Result,
};
use tracing::debug;

use super::check_source;
use crate::{
    derivation::{expect_address, record_address},
    vault::Vault,
};

/// Accounts for [`crate::EscrowEngine::make`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeAccounts {
    /// Signs, pays rent, and funds the vault.
    pub maker: Address,
    /// Mint of the asset being locked.
    pub offered_mint: Address,
    /// Mint of the asset wanted in return.
    pub requested_mint: Address,
    /// Maker's token account of `offered_mint`.
    pub maker_source: Address,
    /// Must equal the record derived from `(maker, nonce)`.
    pub record: Address,
    /// Must equal the record's associated token account of `offered_mint`.
    pub vault: Address,
}

impl MakeAccounts {
    pub(crate) fn addresses(&self) -> [Address; 6] {
        [
            self.maker,
            self.offered_mint,
            self.requested_mint,
            self.maker_source,
            self.record,
            self.vault,
        ]
    }
}

/// Scalar arguments for [`crate::EscrowEngine::make`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeArgs {
    /// Distinguishes concurrent trades by the same maker.
    pub nonce: u64,
    /// Units of `requested_mint` the taker must pay.
    pub requested_amount: u64,
    /// Units of `offered_mint` locked in the vault.
    pub offered_amount: u64,
}

pub(crate) fn process_make(
    tx: &mut Transaction<'_>,
    config: &EngineConfig,
    accounts: &MakeAccounts,
    args: &MakeArgs,
) -> Result<Receipt> {
    let maker = accounts.maker;
    tx.require_signer(&maker)?;

    if args.requested_amount == 0 {
        return Err(EscrowError::ZeroAmount {
            field: "requested_amount",
        });
    }
    if args.offered_amount == 0 {
        return Err(EscrowError::ZeroAmount {
            field: "offered_amount",
        });
    }

    tx.mint(&accounts.offered_mint)?;
    tx.mint(&accounts.requested_mint)?;

    let (record, bump) = record_address(&config.program_id, &maker, args.nonce)?;
    expect_address("record", &record, &accounts.record)?;
    if tx.exists(&record) {
        return Err(EscrowError::RecordAlreadyExists(record));
    }

    check_source(
        tx,
        &accounts.maker_source,
        &accounts.offered_mint,
        &maker,
        args.offered_amount,
    )?;

    let terms = CustodyRecord {
        nonce: args.nonce,
        maker,
        offered_asset: accounts.offered_mint,
        requested_asset: accounts.requested_mint,
        requested_amount: args.requested_amount,
        bump,
    };

    // The record signs for its own creation.
    let nonce_le = args.nonce.to_le_bytes();
    let [tag, maker_seed, nonce_seed] = CustodyRecord::seed_prefix(&maker, &nonce_le);
    tx.sign_with_seeds(&[tag, maker_seed, nonce_seed, &[bump]])?;
    tx.create_account(&maker, &record, &config.program_id, CustodyRecord::LEN)?;
    tx.write_data(&record, &terms.pack())?;

    let vault = Vault::open(
        tx,
        config,
        &maker,
        &record,
        &accounts.offered_mint,
        &accounts.vault,
    )?;
    vault.deposit(tx, &accounts.maker_source, &maker, args.offered_amount)?;

    debug!(
        record = %record.short(),
        vault = %vault.address().short(),
        bump,
        "Custody record opened"
    );

    Ok(Receipt::new(
        ReceiptType::Made,
        record,
        terms,
        args.offered_amount,
        None,
    ))
}
