//! Shared fixture: one ledger, two funded parties, two assets.

#![allow(dead_code)]

use swapvault_engine::{EscrowEngine, MakeAccounts, MakeArgs, RefundAccounts, TakeAccounts};
use swapvault_ledger::{Ledger, Signers};
use swapvault_types::{Address, EngineConfig, Keypair, Receipt, Result};

pub const WALLET_LAMPORTS: u64 = 10_000_000_000;
pub const MAKER_X: u64 = 5_000_000;
pub const TAKER_Y: u64 = 2_000_000;

/// Rent-exempt minimum for a 121-byte record under the default schedule.
pub const RECORD_RENT: u64 = 1_733_040;
/// Rent-exempt minimum for a 72-byte token account under the default schedule.
pub const TOKEN_ACCOUNT_RENT: u64 = 1_392_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Market {
    pub engine: EscrowEngine,
    pub ledger: Ledger,
    pub maker: Keypair,
    pub taker: Keypair,
    /// Offered asset.
    pub mint_x: Address,
    /// Requested asset.
    pub mint_y: Address,
    /// Maker's X account.
    pub maker_x: Address,
    /// Taker's Y account.
    pub taker_y: Address,
}

impl Market {
    pub fn new() -> Self {
        init_tracing();
        let config = EngineConfig::default();
        let mut ledger = Ledger::new(&config);
        let engine = EscrowEngine::deploy(config, &mut ledger).unwrap();

        let maker = Keypair::generate();
        let taker = Keypair::generate();
        let mint_x = Address::from_label("test:mint:x");
        let mint_y = Address::from_label("test:mint:y");

        ledger.create_wallet(maker.address(), WALLET_LAMPORTS).unwrap();
        ledger.create_wallet(taker.address(), WALLET_LAMPORTS).unwrap();
        ledger.create_mint(mint_x, 6).unwrap();
        ledger.create_mint(mint_y, 6).unwrap();

        let maker_x = ledger
            .create_associated_token_account(maker.address(), mint_x)
            .unwrap();
        let taker_y = ledger
            .create_associated_token_account(taker.address(), mint_y)
            .unwrap();
        ledger.mint_to(&maker_x, MAKER_X).unwrap();
        ledger.mint_to(&taker_y, TAKER_Y).unwrap();

        Self {
            engine,
            ledger,
            maker,
            taker,
            mint_x,
            mint_y,
            maker_x,
            taker_y,
        }
    }

    pub fn signers(keypair: &Keypair) -> Signers {
        Signers::pre_verified([keypair.address()]).unwrap()
    }

    pub fn ata(&self, owner: &Address, mint: &Address) -> Address {
        self.ledger.associated_token_address(owner, mint).unwrap()
    }

    pub fn record(&self, nonce: u64) -> Address {
        self.engine
            .record_address(&self.maker.address(), nonce)
            .unwrap()
            .0
    }

    pub fn vault(&self, nonce: u64) -> Address {
        self.engine
            .vault_address(&self.record(nonce), &self.mint_x)
            .unwrap()
    }

    /// Token balance, or zero if the account does not exist.
    pub fn balance(&self, account: &Address) -> u64 {
        self.ledger.token_balance(account).unwrap_or(0)
    }

    pub fn make_accounts(&self, nonce: u64) -> MakeAccounts {
        MakeAccounts {
            maker: self.maker.address(),
            offered_mint: self.mint_x,
            requested_mint: self.mint_y,
            maker_source: self.maker_x,
            record: self.record(nonce),
            vault: self.vault(nonce),
        }
    }

    pub fn take_accounts(&self, nonce: u64) -> TakeAccounts {
        let maker = self.maker.address();
        let taker = self.taker.address();
        TakeAccounts {
            taker,
            maker,
            record: self.record(nonce),
            offered_mint: self.mint_x,
            requested_mint: self.mint_y,
            vault: self.vault(nonce),
            taker_source: self.taker_y,
            taker_destination: self.ata(&taker, &self.mint_x),
            maker_destination: self.ata(&maker, &self.mint_y),
        }
    }

    pub fn refund_accounts(&self, nonce: u64) -> RefundAccounts {
        RefundAccounts {
            maker: self.maker.address(),
            record: self.record(nonce),
            offered_mint: self.mint_x,
            vault: self.vault(nonce),
            maker_destination: self.maker_x,
        }
    }

    pub fn make(&mut self, nonce: u64, offered_amount: u64, requested_amount: u64) -> Result<Receipt> {
        let accounts = self.make_accounts(nonce);
        let args = MakeArgs {
            nonce,
            requested_amount,
            offered_amount,
        };
        let signers = Self::signers(&self.maker);
        self.engine.make(&mut self.ledger, &signers, &accounts, &args)
    }

    pub fn take(&mut self, nonce: u64) -> Result<Receipt> {
        let accounts = self.take_accounts(nonce);
        self.take_with(&accounts)
    }

    pub fn take_with(&mut self, accounts: &TakeAccounts) -> Result<Receipt> {
        let signers = Self::signers(&self.taker);
        self.engine.take(&mut self.ledger, &signers, accounts)
    }

    pub fn refund(&mut self, nonce: u64) -> Result<Receipt> {
        let accounts = self.refund_accounts(nonce);
        let signers = Self::signers(&self.maker);
        self.engine.refund(&mut self.ledger, &signers, &accounts)
    }

    /// Assert per-mint supply equals the sum of token accounts.
    pub fn assert_supply_conserved(&self) {
        for mint in [self.mint_x, self.mint_y] {
            let supply = self.ledger.mint(&mint).unwrap().supply;
            assert_eq!(self.ledger.circulating(&mint), u128::from(supply));
        }
    }
}
