//! Undo-log transactions.
//!
//! The first write to any address snapshots its prior state (or its absence).
//! Commit drops the log; rollback restores every snapshot, deleting accounts
//! the transaction created and resurrecting those it closed. Callers see
//! either every effect or none.

use std::collections::{BTreeSet, HashMap};

use swapvault_types::{
    constants::SYSTEM_PROGRAM_ID, derivation::create_program_address, Address, EscrowError, Mint,
    Result, TokenAccount,
};
use tracing::debug;

use crate::{Account, Ledger, Signers, SupplyConservation};

/// One atomic unit of work against the [`Ledger`].
pub struct Transaction<'a> {
    ledger: &'a mut Ledger,
    /// Program on whose behalf the transaction runs.
    invoker: Address,
    /// Verified signers plus addresses signed for via seeds.
    signers: BTreeSet<Address>,
    /// Prior state of every written address. `None` = did not exist.
    undo: HashMap<Address, Option<Account>>,
    conservation: SupplyConservation,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(ledger: &'a mut Ledger, invoker: Address, signers: &Signers) -> Self {
        let conservation = SupplyConservation::new(ledger.total_lamports());
        Self {
            ledger,
            invoker,
            signers: signers.iter().copied().collect(),
            undo: HashMap::new(),
            conservation,
        }
    }

    /// Verify conservation, then commit or roll back.
    pub(crate) fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let outcome = outcome.and_then(|value| {
            self.conservation.verify(self.ledger())?;
            Ok(value)
        });
        match outcome {
            Ok(value) => {
                debug!(
                    invoker = %self.invoker.short(),
                    touched = self.undo.len(),
                    "Transaction committed"
                );
                Ok(value)
            }
            Err(err) => {
                debug!(
                    invoker = %self.invoker.short(),
                    touched = self.undo.len(),
                    error = %err,
                    "Transaction rolled back"
                );
                self.rollback();
                Err(err)
            }
        }
    }

    fn rollback(self) {
        for (address, prior) in self.undo {
            match prior {
                Some(account) => {
                    self.ledger.accounts.insert(address, account);
                }
                None => {
                    self.ledger.accounts.remove(&address);
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Read-only view of the ledger as modified so far.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        self.ledger
    }

    #[must_use]
    pub fn invoker(&self) -> Address {
        self.invoker
    }

    #[must_use]
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.ledger.get(address)
    }

    #[must_use]
    pub fn exists(&self, address: &Address) -> bool {
        self.ledger.contains(address)
    }

    /// # Errors
    /// See [`Ledger::token_account`].
    pub fn token_account(&self, address: &Address) -> Result<TokenAccount> {
        self.ledger.token_account(address)
    }

    /// # Errors
    /// See [`Ledger::mint`].
    pub fn mint(&self, address: &Address) -> Result<Mint> {
        self.ledger.mint(address)
    }

    /// # Errors
    /// See [`Ledger::associated_token_address`].
    pub fn associated_token_address(&self, owner: &Address, mint: &Address) -> Result<Address> {
        self.ledger.associated_token_address(owner, mint)
    }

    // -----------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------

    #[must_use]
    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    /// # Errors
    /// Returns `MissingSignature` if `address` has not signed.
    pub fn require_signer(&self, address: &Address) -> Result<()> {
        if self.is_signer(address) {
            Ok(())
        } else {
            Err(EscrowError::MissingSignature(*address))
        }
    }

    /// Sign for the address derived from `seeds` (bump included) under the
    /// invoking program. This is the only way a derived address gains
    /// authority, and only a transaction opened with that program's
    /// [`crate::ProgramKey`] can produce it.
    ///
    /// # Errors
    /// Returns `InvalidSeeds` if the seeds do not derive an off-curve address.
    pub fn sign_with_seeds(&mut self, seeds: &[&[u8]]) -> Result<Address> {
        let address = create_program_address(seeds, &self.invoker)?;
        self.signers.insert(address);
        Ok(address)
    }

    // -----------------------------------------------------------------
    // Account lifecycle
    // -----------------------------------------------------------------

    /// Create a zeroed, rent-exempt account of `space` bytes owned by `owner`,
    /// funded by `payer`. Both `payer` and `address` must have signed.
    ///
    /// # Errors
    /// `MissingSignature`, `AccountAlreadyExists`, `InvalidAccountOwner`
    /// (payer not a wallet), or `InsufficientLamports`.
    pub fn create_account(
        &mut self,
        payer: &Address,
        address: &Address,
        owner: &Address,
        space: usize,
    ) -> Result<()> {
        self.require_signer(payer)?;
        self.require_signer(address)?;
        if self.exists(address) {
            return Err(EscrowError::AccountAlreadyExists(*address));
        }

        let lamports = self.ledger.rent().minimum_balance(space);
        self.debit_wallet(payer, lamports)?;
        self.put(*address, Account::new(lamports, *owner, space));

        debug!(account = %address.short(), owner = %owner.short(), space, lamports, "Account created");
        Ok(())
    }

    /// Overwrite the data of an account owned by the invoking program.
    ///
    /// # Errors
    /// `AccountNotFound`, `InvalidAccountOwner`, or `InvalidAccountData` on a
    /// length mismatch.
    pub fn write_data(&mut self, address: &Address, data: &[u8]) -> Result<()> {
        let invoker = self.invoker;
        let account = self.account_mut(address)?;
        if account.owner != invoker {
            return Err(EscrowError::InvalidAccountOwner {
                account: *address,
                expected: invoker,
                actual: account.owner,
            });
        }
        if account.data.len() != data.len() {
            return Err(EscrowError::InvalidAccountData {
                reason: format!(
                    "write of {} bytes into {}-byte account",
                    data.len(),
                    account.data.len()
                ),
            });
        }
        account.data.copy_from_slice(data);
        Ok(())
    }

    /// Close an account owned by the invoking program, sending its lamports
    /// to `destination`.
    ///
    /// # Errors
    /// `AccountNotFound` or `InvalidAccountOwner`.
    pub fn close_program_account(&mut self, address: &Address, destination: &Address) -> Result<u64> {
        let account = self
            .account(address)
            .ok_or(EscrowError::AccountNotFound(*address))?;
        if account.owner != self.invoker {
            return Err(EscrowError::InvalidAccountOwner {
                account: *address,
                expected: self.invoker,
                actual: account.owner,
            });
        }
        self.close_into(address, destination)
    }

    // -----------------------------------------------------------------
    // Token operations
    // -----------------------------------------------------------------

    /// Create the associated token account for `(owner, mint)` if missing,
    /// funded by `payer`. An existing account is validated and reused.
    ///
    /// # Errors
    /// `AssetMismatch`/`TokenOwnerMismatch` if the existing account is not for
    /// `(owner, mint)`; `MissingSignature` or `InsufficientLamports` on create.
    pub fn create_associated_token_account(
        &mut self,
        payer: &Address,
        owner: &Address,
        mint: &Address,
    ) -> Result<Address> {
        self.mint(mint)?;
        let address = self.associated_token_address(owner, mint)?;

        if self.exists(&address) {
            let existing = self.token_account(&address)?;
            check_token_account(&address, &existing, mint, owner)?;
            return Ok(address);
        }

        self.require_signer(payer)?;
        let lamports = self.ledger.rent().minimum_balance(TokenAccount::LEN);
        self.debit_wallet(payer, lamports)?;
        let token_program = self.ledger.token_program_id();
        self.put(
            address,
            Account {
                lamports,
                owner: token_program,
                data: TokenAccount::new(*mint, *owner).pack(),
            },
        );
        self.conservation.track_mint(*mint);

        debug!(account = %address.short(), owner = %owner.short(), mint = %mint.short(), "Associated token account created");
        Ok(address)
    }

    /// Move `amount` units from `from` to `to`. `authority` must own `from`
    /// and must have signed (directly or via seeds).
    ///
    /// # Errors
    /// `MissingSignature`, `TokenOwnerMismatch`, `AssetMismatch`,
    /// `InsufficientFunds`, or `ArithmeticOverflow`.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        authority: &Address,
        amount: u64,
    ) -> Result<()> {
        self.require_signer(authority)?;
        let mut source = self.token_account(from)?;
        let mut destination = self.token_account(to)?;

        if source.owner != *authority {
            return Err(EscrowError::TokenOwnerMismatch {
                account: *from,
                expected: *authority,
                actual: source.owner,
            });
        }
        if source.mint != destination.mint {
            return Err(EscrowError::AssetMismatch {
                account: *to,
                expected: source.mint,
                actual: destination.mint,
            });
        }
        if source.amount < amount {
            return Err(EscrowError::InsufficientFunds {
                account: *from,
                needed: amount,
                available: source.amount,
            });
        }
        if from == to {
            return Ok(());
        }

        source.amount -= amount;
        destination.amount = destination
            .amount
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        self.write_token(from, &source)?;
        self.write_token(to, &destination)?;
        self.conservation.track_mint(source.mint);
        Ok(())
    }

    /// Close an empty token account, sending its lamports to `destination`.
    ///
    /// # Errors
    /// `MissingSignature`, `TokenOwnerMismatch`, or `InvalidAccountData` if the
    /// balance is non-zero or `destination` is the account itself.
    pub fn close_token_account(
        &mut self,
        address: &Address,
        destination: &Address,
        authority: &Address,
    ) -> Result<u64> {
        self.require_signer(authority)?;
        let token = self.token_account(address)?;
        if token.owner != *authority {
            return Err(EscrowError::TokenOwnerMismatch {
                account: *address,
                expected: *authority,
                actual: token.owner,
            });
        }
        if token.amount != 0 {
            return Err(EscrowError::InvalidAccountData {
                reason: format!("cannot close {address}: holds {} tokens", token.amount),
            });
        }
        self.conservation.track_mint(token.mint);
        self.close_into(address, destination)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn snapshot(&mut self, address: Address) {
        if !self.undo.contains_key(&address) {
            let prior = self.ledger.accounts.get(&address).cloned();
            self.undo.insert(address, prior);
        }
    }

    fn account_mut(&mut self, address: &Address) -> Result<&mut Account> {
        self.snapshot(*address);
        self.ledger
            .accounts
            .get_mut(address)
            .ok_or(EscrowError::AccountNotFound(*address))
    }

    fn put(&mut self, address: Address, account: Account) {
        self.snapshot(address);
        self.ledger.accounts.insert(address, account);
    }

    fn write_token(&mut self, address: &Address, token: &TokenAccount) -> Result<()> {
        let account = self.account_mut(address)?;
        account.data = token.pack();
        Ok(())
    }

    /// Debit lamports from a system-owned wallet.
    fn debit_wallet(&mut self, payer: &Address, lamports: u64) -> Result<()> {
        let account = self
            .account(payer)
            .ok_or(EscrowError::AccountNotFound(*payer))?;
        if !account.is_owned_by(&SYSTEM_PROGRAM_ID) {
            return Err(EscrowError::InvalidAccountOwner {
                account: *payer,
                expected: SYSTEM_PROGRAM_ID,
                actual: account.owner,
            });
        }
        if account.lamports < lamports {
            return Err(EscrowError::InsufficientLamports {
                account: *payer,
                needed: lamports,
                available: account.lamports,
            });
        }
        self.account_mut(payer)?.lamports -= lamports;
        Ok(())
    }

    /// Credit lamports, creating a wallet if `address` does not exist.
    fn credit(&mut self, address: &Address, lamports: u64) -> Result<()> {
        if self.exists(address) {
            let account = self.account_mut(address)?;
            account.lamports = account
                .lamports
                .checked_add(lamports)
                .ok_or(EscrowError::ArithmeticOverflow)?;
        } else {
            self.put(*address, Account::wallet(lamports));
        }
        Ok(())
    }

    /// Delete `address` and move all its lamports to `destination`.
    fn close_into(&mut self, address: &Address, destination: &Address) -> Result<u64> {
        if address == destination {
            return Err(EscrowError::InvalidAccountData {
                reason: format!("cannot close {address} into itself"),
            });
        }
        self.snapshot(*address);
        let closed = self
            .ledger
            .accounts
            .remove(address)
            .ok_or(EscrowError::AccountNotFound(*address))?;
        self.credit(destination, closed.lamports)?;
        debug!(account = %address.short(), destination = %destination.short(), lamports = closed.lamports, "Account closed");
        Ok(closed.lamports)
    }
}

/// Check a token account holds `mint` and is owned by `owner`.
///
/// # Errors
/// `AssetMismatch` or `TokenOwnerMismatch`.
pub fn check_token_account(
    address: &Address,
    token: &TokenAccount,
    mint: &Address,
    owner: &Address,
) -> Result<()> {
    if token.mint != *mint {
        return Err(EscrowError::AssetMismatch {
            account: *address,
            expected: *mint,
            actual: token.mint,
        });
    }
    if token.owner != *owner {
        return Err(EscrowError::TokenOwnerMismatch {
            account: *address,
            expected: *owner,
            actual: token.owner,
        });
    }
    Ok(())
}
