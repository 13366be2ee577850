//! Provisioning outside any transaction.
//!
//! Funding wallets and issuing assets belong to systems the escrow engine does
//! not model. These helpers write straight into the ledger so hosts and tests
//! can set up state. They create lamports and supply from nothing, so they
//! never run inside a [`crate::Transaction`].

use swapvault_types::{Address, EscrowError, Mint, Result, TokenAccount};
use tracing::debug;

use crate::{Account, Ledger};

impl Ledger {
    /// Create a system-owned wallet holding `lamports`.
    ///
    /// # Errors
    /// `AccountAlreadyExists` if `address` is taken.
    pub fn create_wallet(&mut self, address: Address, lamports: u64) -> Result<()> {
        self.insert_new(address, Account::wallet(lamports))?;
        debug!(wallet = %address.short(), lamports, "Wallet provisioned");
        Ok(())
    }

    /// Add lamports to `address`, creating a wallet if it does not exist.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if the balance would exceed `u64::MAX`.
    pub fn airdrop(&mut self, address: Address, lamports: u64) -> Result<()> {
        match self.accounts.get_mut(&address) {
            Some(account) => {
                account.lamports = account
                    .lamports
                    .checked_add(lamports)
                    .ok_or(EscrowError::ArithmeticOverflow)?;
            }
            None => {
                self.accounts.insert(address, Account::wallet(lamports));
            }
        }
        Ok(())
    }

    /// Create an initialized, rent-exempt mint with zero supply.
    ///
    /// # Errors
    /// `AccountAlreadyExists` if `address` is taken.
    pub fn create_mint(&mut self, address: Address, decimals: u8) -> Result<()> {
        let mint = Mint {
            supply: 0,
            decimals,
            is_initialized: true,
        };
        let account = Account {
            lamports: self.rent().minimum_balance(Mint::LEN),
            owner: self.token_program_id(),
            data: mint.pack(),
        };
        self.insert_new(address, account)?;
        debug!(mint = %address.short(), decimals, "Mint provisioned");
        Ok(())
    }

    /// Create an empty, rent-exempt token account of `mint` held by `owner`.
    ///
    /// # Errors
    /// `AccountNotFound`/`InvalidAccountData` if `mint` is not a mint;
    /// `AccountAlreadyExists` if `address` is taken.
    pub fn create_token_account(
        &mut self,
        address: Address,
        mint: Address,
        owner: Address,
    ) -> Result<()> {
        self.mint(&mint)?;
        let account = Account {
            lamports: self.rent().minimum_balance(TokenAccount::LEN),
            owner: self.token_program_id(),
            data: TokenAccount::new(mint, owner).pack(),
        };
        self.insert_new(address, account)
    }

    /// Create the associated token account for `(owner, mint)`.
    ///
    /// # Errors
    /// As [`Ledger::create_token_account`].
    pub fn create_associated_token_account(
        &mut self,
        owner: Address,
        mint: Address,
    ) -> Result<Address> {
        let address = self.associated_token_address(&owner, &mint)?;
        self.create_token_account(address, mint, owner)?;
        Ok(address)
    }

    /// Issue `amount` new units into the token account at `address`,
    /// increasing the mint's supply by the same amount.
    ///
    /// # Errors
    /// `AccountNotFound`, `InvalidAccountOwner`, `InvalidAccountData`, or
    /// `ArithmeticOverflow`.
    pub fn mint_to(&mut self, address: &Address, amount: u64) -> Result<()> {
        let mut token = self.token_account(address)?;
        let mut mint = self.mint(&token.mint)?;

        mint.supply = mint
            .supply
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        token.amount = token
            .amount
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        self.overwrite_data(&token.mint, mint.pack())?;
        self.overwrite_data(address, token.pack())?;
        debug!(account = %address.short(), amount, supply = mint.supply, "Minted");
        Ok(())
    }

    /// Insert or replace an account verbatim.
    ///
    /// Bypasses every ownership and layout check. Hosts use it to restore
    /// snapshots; tests use it to plant forged accounts.
    pub fn set_account(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, account);
    }

    fn insert_new(&mut self, address: Address, account: Account) -> Result<()> {
        if self.accounts.contains_key(&address) {
            return Err(EscrowError::AccountAlreadyExists(address));
        }
        self.accounts.insert(address, account);
        Ok(())
    }

    fn overwrite_data(&mut self, address: &Address, data: Vec<u8>) -> Result<()> {
        let account = self
            .accounts
            .get_mut(address)
            .ok_or(EscrowError::AccountNotFound(*address))?;
        account.data = data;
        Ok(())
    }
}
