//! Instruction account sets and their processors.
//!
//! Each instruction names every account it touches. Processors run inside
//! one ledger transaction and never trust a supplied address: records are
//! re-derived from their stored seeds, vaults and destinations from their
//! associated-token derivation.

mod make;
mod refund;
mod take;

pub use make::{MakeAccounts, MakeArgs};
pub use refund::RefundAccounts;
pub use take::TakeAccounts;

pub(crate) use make::process_make;
pub(crate) use refund::process_refund;
pub(crate) use take::process_take;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use swapvault_ledger::{transaction::check_token_account, Ledger, Transaction};
use swapvault_types::{Address, CustodyRecord, EscrowError, Result};

use crate::derivation::{expect_address, record_address, stored_record_address};

/// Domain separator prefixed to every instruction signing payload.
const SIGNING_DOMAIN: &[u8] = b"swapvault:ix:v1:";

/// One engine request, as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    Make {
        accounts: MakeAccounts,
        args: MakeArgs,
    },
    Take(TakeAccounts),
    Refund(RefundAccounts),
}

impl Instruction {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Make { .. } => "make",
            Self::Take(_) => "take",
            Self::Refund(_) => "refund",
        }
    }

    /// The record this instruction targets.
    #[must_use]
    pub fn record(&self) -> Address {
        match self {
            Self::Make { accounts, .. } => accounts.record,
            Self::Take(accounts) => accounts.record,
            Self::Refund(accounts) => accounts.record,
        }
    }

    /// Canonical bytes every required signer signs.
    ///
    /// Format: `"swapvault:ix:v1:" || tag || accounts (in declaration order) || args`
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(SIGNING_DOMAIN.len() + 1 + 9 * 32 + 24);
        payload.extend_from_slice(SIGNING_DOMAIN);
        match self {
            Self::Make { accounts, args } => {
                payload.push(0);
                for address in accounts.addresses() {
                    payload.extend_from_slice(address.as_bytes());
                }
                payload.extend_from_slice(&args.nonce.to_le_bytes());
                payload.extend_from_slice(&args.requested_amount.to_le_bytes());
                payload.extend_from_slice(&args.offered_amount.to_le_bytes());
            }
            Self::Take(accounts) => {
                payload.push(1);
                for address in accounts.addresses() {
                    payload.extend_from_slice(address.as_bytes());
                }
            }
            Self::Refund(accounts) => {
                payload.push(2);
                for address in accounts.addresses() {
                    payload.extend_from_slice(address.as_bytes());
                }
            }
        }
        payload
    }

    /// Hex SHA-256 of [`Instruction::signing_payload`], for log correlation.
    #[must_use]
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.signing_payload()))
    }
}

/// Read and decode the record at `address` without authenticating it.
///
/// # Errors
/// `RecordNotFound`, `InvalidAccountOwner`, or `InvalidRecordData`.
pub(crate) fn read_record(
    ledger: &Ledger,
    program_id: &Address,
    address: &Address,
) -> Result<CustodyRecord> {
    let account = ledger
        .get(address)
        .ok_or(EscrowError::RecordNotFound(*address))?;
    if !account.is_owned_by(program_id) {
        return Err(EscrowError::InvalidAccountOwner {
            account: *address,
            expected: *program_id,
            actual: account.owner,
        });
    }
    CustodyRecord::unpack(&account.data)
}

/// Load an open record and prove it sits at the address its own seeds derive.
///
/// # Errors
/// As [`read_record`], plus `AddressMismatch` for a record stored anywhere
/// but its derived address.
pub(crate) fn load_record(
    tx: &Transaction<'_>,
    address: &Address,
) -> Result<CustodyRecord> {
    let program_id = tx.invoker();
    let terms = read_record(tx.ledger(), &program_id, address)?;
    let derived = match stored_record_address(&program_id, &terms) {
        Ok(derived) => derived,
        Err(EscrowError::InvalidSeeds) => {
            record_address(&program_id, &terms.maker, terms.nonce)?.0
        }
        Err(err) => return Err(err),
    };
    expect_address("record", &derived, address)?;
    Ok(terms)
}

/// Resolve a destination token account of `mint` for `owner`.
///
/// An existing account must hold `mint` and belong to `owner`. A missing one
/// must be supplied at the associated address and is created, paid by `payer`.
///
/// # Errors
/// `AssetMismatch`, `TokenOwnerMismatch`, `AddressMismatch`, or creation errors.
pub(crate) fn ensure_destination(
    tx: &mut Transaction<'_>,
    role: &'static str,
    payer: &Address,
    owner: &Address,
    mint: &Address,
    supplied: &Address,
) -> Result<()> {
    if tx.exists(supplied) {
        let token = tx.token_account(supplied)?;
        return check_token_account(supplied, &token, mint, owner);
    }
    let expected = tx.associated_token_address(owner, mint)?;
    expect_address(role, &expected, supplied)?;
    tx.create_associated_token_account(payer, owner, mint)?;
    Ok(())
}

/// Check a supplied mint against the one stored on the record.
pub(crate) fn expect_asset(record: &Address, stored: &Address, supplied: &Address) -> Result<()> {
    if stored == supplied {
        Ok(())
    } else {
        Err(EscrowError::AssetMismatch {
            account: *record,
            expected: *stored,
            actual: *supplied,
        })
    }
}

/// Check a source token account holds `mint`, belongs to `owner`, and
/// covers `amount`.
pub(crate) fn check_source(
    tx: &Transaction<'_>,
    source: &Address,
    mint: &Address,
    owner: &Address,
    amount: u64,
) -> Result<()> {
    let token = tx.token_account(source)?;
    check_token_account(source, &token, mint, owner)?;
    if token.amount < amount {
        return Err(EscrowError::InsufficientFunds {
            account: *source,
            needed: amount,
            available: token.amount,
        });
    }
    Ok(())
}
