//! The escrow engine: three entry points, each one atomic ledger transaction.
//!
//! ```text
//! make   : ∅    → OPEN   record created, vault funded
//! take   : OPEN → ∅      taker pays maker, vault → taker, accounts closed
//! refund : OPEN → ∅      vault → maker, accounts closed
//! ```
//!
//! A rejected call leaves every account byte-for-byte as it was.
//!
//! The engine deploys its program id on one ledger and keeps the only key.
//! No other caller can open a transaction as the escrow program, so no other
//! code path can sign for a record and move vault funds.

use swapvault_ledger::{Ledger, ProgramKey, Signers, Transaction};
use swapvault_types::{
    constants::{ENGINE_NAME, VERSION},
    Address, CustodyRecord, EngineConfig, EscrowError, Receipt, Result,
};
use tracing::{info, warn};

use crate::{
    derivation,
    instructions::{
        self, process_make, process_refund, process_take, Instruction, MakeAccounts, MakeArgs,
        RefundAccounts, TakeAccounts,
    },
};

/// Escrow state machine bound to one program id on one ledger.
#[derive(Debug, Clone)]
pub struct EscrowEngine {
    config: EngineConfig,
    program: ProgramKey,
}

impl EscrowEngine {
    /// Deploy the escrow program on `ledger`.
    ///
    /// # Errors
    /// - `Configuration` if the program ids collide or the ledger disagrees
    ///   on the token program ids
    /// - `ProgramAlreadyDeployed` if the escrow program id is taken
    pub fn deploy(config: EngineConfig, ledger: &mut Ledger) -> Result<Self> {
        config.validate()?;
        check_ledger(&config, ledger)?;
        let program = ledger.deploy(config.program_id)?;
        info!(
            engine = ENGINE_NAME,
            version = VERSION,
            program = %config.program_id.short(),
            "Escrow program deployed"
        );
        Ok(Self { config, program })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record address and bump for `(maker, nonce)`.
    ///
    /// # Errors
    /// Propagates derivation errors (practically unreachable).
    pub fn record_address(&self, maker: &Address, nonce: u64) -> Result<(Address, u8)> {
        derivation::record_address(&self.config.program_id, maker, nonce)
    }

    /// Vault address for a record holding `offered_asset`.
    ///
    /// # Errors
    /// Propagates derivation errors (practically unreachable).
    pub fn vault_address(&self, record: &Address, offered_asset: &Address) -> Result<Address> {
        derivation::vault_address(&self.config, record, offered_asset)
    }

    /// Read the terms of the open record at `address`.
    ///
    /// # Errors
    /// `RecordNotFound` once the trade has been taken or refunded (or never
    /// existed); `InvalidAccountOwner`/`InvalidRecordData` for a foreign account.
    pub fn fetch_record(&self, ledger: &Ledger, address: &Address) -> Result<CustodyRecord> {
        instructions::read_record(ledger, &self.config.program_id, address)
    }

    /// Open a trade.
    ///
    /// # Errors
    /// `MissingSignature`, `ZeroAmount`, `RecordAlreadyExists`, `AddressMismatch`,
    /// `AssetMismatch`, `TokenOwnerMismatch`, `VaultNotEmpty`,
    /// `InsufficientFunds`, or `InsufficientLamports`. Nothing changes on error.
    pub fn make(
        &self,
        ledger: &mut Ledger,
        signers: &Signers,
        accounts: &MakeAccounts,
        args: &MakeArgs,
    ) -> Result<Receipt> {
        self.run(ledger, signers, "make", accounts.record, |tx, config| {
            process_make(tx, config, accounts, args)
        })
    }

    /// Fulfill an open trade.
    ///
    /// # Errors
    /// `MissingSignature`, `RecordNotFound`, `AddressMismatch`, `AssetMismatch`,
    /// `TokenOwnerMismatch`, `InsufficientFunds`, or `InsufficientLamports`.
    /// Nothing changes on error.
    pub fn take(
        &self,
        ledger: &mut Ledger,
        signers: &Signers,
        accounts: &TakeAccounts,
    ) -> Result<Receipt> {
        self.run(ledger, signers, "take", accounts.record, |tx, config| {
            process_take(tx, config, accounts)
        })
    }

    /// Cancel an open trade and return the vault to its maker.
    ///
    /// # Errors
    /// `MissingSignature`, `Unauthorized`, `RecordNotFound`, `AddressMismatch`,
    /// `AssetMismatch`, or `TokenOwnerMismatch`. Nothing changes on error.
    pub fn refund(
        &self,
        ledger: &mut Ledger,
        signers: &Signers,
        accounts: &RefundAccounts,
    ) -> Result<Receipt> {
        self.run(ledger, signers, "refund", accounts.record, |tx, config| {
            process_refund(tx, config, accounts)
        })
    }

    /// Verify `signatures` over the instruction's signing payload, then
    /// dispatch it.
    ///
    /// # Errors
    /// `InvalidSigner`/`InvalidSignature` from verification, otherwise as the
    /// dispatched entry point.
    pub fn process(
        &self,
        ledger: &mut Ledger,
        instruction: &Instruction,
        signatures: &[(Address, [u8; 64])],
    ) -> Result<Receipt> {
        let signers = match Signers::verify(&instruction.signing_payload(), signatures) {
            Ok(signers) => signers,
            Err(err) => {
                warn!(
                    op = instruction.name(),
                    digest = %instruction.digest(),
                    code = %err,
                    "Instruction signatures rejected"
                );
                return Err(err);
            }
        };
        match instruction {
            Instruction::Make { accounts, args } => self.make(ledger, &signers, accounts, args),
            Instruction::Take(accounts) => self.take(ledger, &signers, accounts),
            Instruction::Refund(accounts) => self.refund(ledger, &signers, accounts),
        }
    }

    /// Run one transition atomically and log its outcome.
    fn run<F>(
        &self,
        ledger: &mut Ledger,
        signers: &Signers,
        op: &'static str,
        record: Address,
        f: F,
    ) -> Result<Receipt>
    where
        F: FnOnce(&mut Transaction<'_>, &EngineConfig) -> Result<Receipt>,
    {
        let outcome = ledger.transact(&self.program, signers, |tx| f(tx, &self.config));

        match &outcome {
            Ok(receipt) => info!(
                op,
                record = %record.short(),
                receipt = %receipt.id,
                maker = %receipt.terms.maker.short(),
                offered_amount = receipt.offered_amount,
                requested_amount = receipt.terms.requested_amount,
                "Transition committed"
            ),
            Err(err) => warn!(
                op,
                record = %record.short(),
                kind = ?err.kind(),
                code = %err,
                "Transition rejected"
            ),
        }
        outcome
    }
}

/// The ledger must agree with the engine on the token program ids, or vault
/// derivations would diverge.
fn check_ledger(config: &EngineConfig, ledger: &Ledger) -> Result<()> {
    if ledger.token_program_id() != config.token_program_id
        || ledger.associated_token_program_id() != config.associated_token_program_id
    {
        return Err(EscrowError::Configuration(
            "ledger and engine disagree on token program ids".to_string(),
        ));
    }
    Ok(())
}
