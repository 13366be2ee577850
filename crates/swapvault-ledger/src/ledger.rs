//! The account store.
//!
//! The ledger maps addresses to [`Account`]s and hands out [`Transaction`]s.
//! Every mutation goes through `&mut Ledger`, so writers are serialized by
//! construction: two transitions racing on the same record address run one
//! after the other, and the loser sees the winner's committed state.

use std::collections::{BTreeSet, HashMap};

use swapvault_types::{
    constants::SYSTEM_PROGRAM_ID, derivation::associated_token_address, Address, EngineConfig,
    EscrowError, Mint, RentConfig, Result, TokenAccount,
};
use uuid::Uuid;

use crate::{Account, ProgramKey, Signers, Transaction};

/// In-memory account ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    /// All live accounts.
    pub(crate) accounts: HashMap<Address, Account>,
    /// Owner of mints and token accounts.
    token_program_id: Address,
    /// Namespace for associated token account derivation.
    associated_token_program_id: Address,
    /// Rent parameters for new accounts.
    rent: RentConfig,
    /// Identity that binds issued [`ProgramKey`]s to this ledger.
    pub(crate) instance: Uuid,
    /// Claimed program ids.
    pub(crate) programs: BTreeSet<Address>,
}

impl Ledger {
    /// Create an empty ledger using the program ids and rent from `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            accounts: HashMap::new(),
            token_program_id: config.token_program_id,
            associated_token_program_id: config.associated_token_program_id,
            rent: config.rent,
            instance: Uuid::now_v7(),
            programs: BTreeSet::from([
                SYSTEM_PROGRAM_ID,
                config.token_program_id,
                config.associated_token_program_id,
            ]),
        }
    }

    /// Run `f` as one atomic unit on behalf of the program holding `program`.
    ///
    /// 1. Open a transaction with the verified `signers`
    /// 2. Run `f`, recording every touched account in the undo log
    /// 3. Verify supply conservation
    /// 4. Commit, or restore every snapshot if any step failed
    ///
    /// # Errors
    /// `InvalidProgramKey` if another ledger issued `program`. Otherwise
    /// propagates the first error from `f` or from the conservation check;
    /// the ledger is then byte-for-byte what it was before the call.
    pub fn transact<T, F>(&mut self, program: &ProgramKey, signers: &Signers, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        self.check_key(program)?;
        let mut tx = Transaction::begin(self, program.program_id(), signers);
        let outcome = f(&mut tx);
        tx.finish(outcome)
    }

    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Number of live accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Lamports held by `address` (zero if it does not exist).
    #[must_use]
    pub fn lamports(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.lamports)
    }

    /// Sum of lamports over every account.
    #[must_use]
    pub fn total_lamports(&self) -> u128 {
        self.accounts
            .values()
            .map(|a| u128::from(a.lamports))
            .sum()
    }

    #[must_use]
    pub fn token_program_id(&self) -> Address {
        self.token_program_id
    }

    #[must_use]
    pub fn associated_token_program_id(&self) -> Address {
        self.associated_token_program_id
    }

    #[must_use]
    pub fn rent(&self) -> &RentConfig {
        &self.rent
    }

    /// Load an account that must be owned by the token program.
    pub(crate) fn token_owned(&self, address: &Address) -> Result<&Account> {
        let account = self
            .accounts
            .get(address)
            .ok_or(EscrowError::AccountNotFound(*address))?;
        if !account.is_owned_by(&self.token_program_id) {
            return Err(EscrowError::InvalidAccountOwner {
                account: *address,
                expected: self.token_program_id,
                actual: account.owner,
            });
        }
        Ok(account)
    }

    /// Decode the token account at `address`.
    ///
    /// # Errors
    /// `AccountNotFound`, `InvalidAccountOwner`, or `InvalidAccountData`.
    pub fn token_account(&self, address: &Address) -> Result<TokenAccount> {
        TokenAccount::unpack(&self.token_owned(address)?.data)
    }

    /// Balance of the token account at `address`.
    ///
    /// # Errors
    /// Same as [`Ledger::token_account`].
    pub fn token_balance(&self, address: &Address) -> Result<u64> {
        Ok(self.token_account(address)?.amount)
    }

    /// Decode the mint at `address`.
    ///
    /// # Errors
    /// `AccountNotFound`, `InvalidAccountOwner`, or `InvalidAccountData`.
    pub fn mint(&self, address: &Address) -> Result<Mint> {
        Mint::unpack(&self.token_owned(address)?.data)
    }

    /// Units of `mint` held across all token accounts.
    #[must_use]
    pub fn circulating(&self, mint: &Address) -> u128 {
        self.accounts
            .values()
            .filter(|a| a.is_owned_by(&self.token_program_id) && a.data.len() == TokenAccount::LEN)
            .filter_map(|a| TokenAccount::unpack(&a.data).ok())
            .filter(|t| t.mint == *mint)
            .map(|t| u128::from(t.amount))
            .sum()
    }

    /// The associated token account address for `(owner, mint)`.
    ///
    /// Seeds: `[owner, token_program_id, mint]` under the associated-token program.
    ///
    /// # Errors
    /// Propagates derivation errors (practically unreachable).
    pub fn associated_token_address(&self, owner: &Address, mint: &Address) -> Result<Address> {
        associated_token_address(
            owner,
            mint,
            &self.token_program_id,
            &self.associated_token_program_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        Ledger::new(&EngineConfig::default())
    }

    #[test]
    fn empty_ledger() {
        let l = ledger();
        assert!(l.is_empty());
        assert_eq!(l.total_lamports(), 0);
        assert_eq!(l.lamports(&Address::ZERO), 0);
    }

    #[test]
    fn token_account_requires_token_owner() {
        let mut l = ledger();
        let addr = Address([1; 32]);
        l.create_wallet(addr, 100).unwrap();
        let err = l.token_account(&addr).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidAccountOwner { .. }));
        let err = l.token_account(&Address([2; 32])).unwrap_err();
        assert_eq!(err, EscrowError::AccountNotFound(Address([2; 32])));
    }

    #[test]
    fn ata_is_deterministic_and_owner_specific() {
        let l = ledger();
        let mint = Address([3; 32]);
        let a = l.associated_token_address(&Address([1; 32]), &mint).unwrap();
        let b = l.associated_token_address(&Address([1; 32]), &mint).unwrap();
        let c = l.associated_token_address(&Address([2; 32]), &mint).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn failed_transaction_leaves_ledger_untouched() {
        let mut l = ledger();
        let payer = Address([1; 32]);
        l.create_wallet(payer, 10).unwrap();
        let before = l.clone();

        let program = l.deploy(Address([9; 32])).unwrap();
        let signers = Signers::default();
        let err = l
            .transact(&program, &signers, |tx| {
                tx.require_signer(&payer)?;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err, EscrowError::MissingSignature(payer));
        assert_eq!(l.accounts, before.accounts);
    }
}
