//! The vault: a token account whose authority is the record address.
//!
//! No party holds a key for that authority. Debiting the vault requires the
//! engine to sign with the record's seeds, and [`Vault::disburse_and_close`]
//! is the only code path that does so.

use swapvault_ledger::{transaction::check_token_account, Transaction};
use swapvault_types::{Address, CustodyRecord, EngineConfig, EscrowError, Result};

use crate::derivation::{expect_address, vault_address};

/// Handle to a validated vault inside one transaction.
#[derive(Debug)]
pub(crate) struct Vault {
    address: Address,
    /// The record address; sole token authority of the vault.
    authority: Address,
}

impl Vault {
    /// Create the vault for a new record, or adopt an existing empty one.
    pub(crate) fn open(
        tx: &mut Transaction<'_>,
        config: &EngineConfig,
        payer: &Address,
        record: &Address,
        offered_asset: &Address,
        supplied: &Address,
    ) -> Result<Self> {
        let address = vault_address(config, record, offered_asset)?;
        expect_address("vault", &address, supplied)?;

        if tx.exists(&address) {
            let existing = tx.token_account(&address)?;
            check_token_account(&address, &existing, offered_asset, record)?;
            if existing.amount != 0 {
                return Err(EscrowError::VaultNotEmpty {
                    vault: address,
                    amount: existing.amount,
                });
            }
        } else {
            tx.create_associated_token_account(payer, record, offered_asset)?;
        }

        Ok(Self {
            address,
            authority: *record,
        })
    }

    /// Validate the vault of an open record.
    pub(crate) fn load(
        tx: &Transaction<'_>,
        config: &EngineConfig,
        record: &Address,
        terms: &CustodyRecord,
        supplied: &Address,
    ) -> Result<Self> {
        let address = vault_address(config, record, &terms.offered_asset)?;
        expect_address("vault", &address, supplied)?;
        let token = tx.token_account(&address)?;
        check_token_account(&address, &token, &terms.offered_asset, record)?;
        Ok(Self {
            address,
            authority: *record,
        })
    }

    pub(crate) fn address(&self) -> Address {
        self.address
    }

    /// Move `amount` from `source` into the vault. `owner` must sign.
    pub(crate) fn deposit(
        &self,
        tx: &mut Transaction<'_>,
        source: &Address,
        owner: &Address,
        amount: u64,
    ) -> Result<()> {
        tx.transfer(source, &self.address, owner, amount)
    }

    /// Pay the whole balance to `destination`, then close the vault and send
    /// its lamports to `rent_recipient`. Returns the amount disbursed.
    pub(crate) fn disburse_and_close(
        self,
        tx: &mut Transaction<'_>,
        terms: &CustodyRecord,
        destination: &Address,
        rent_recipient: &Address,
    ) -> Result<u64> {
        let nonce_le = terms.nonce.to_le_bytes();
        let [tag, maker, nonce] = CustodyRecord::seed_prefix(&terms.maker, &nonce_le);
        let signer = tx.sign_with_seeds(&[tag, maker, nonce, &[terms.bump]])?;
        expect_address("record", &self.authority, &signer)?;

        let amount = tx.token_account(&self.address)?.amount;
        tx.transfer(&self.address, destination, &self.authority, amount)?;
        tx.close_token_account(&self.address, rent_recipient, &self.authority)?;
        Ok(amount)
    }
}
