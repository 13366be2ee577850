//! Record and vault address derivation.
//!
//! Both mappings are pure functions of public inputs, so any verifier can
//! recompute them. Every entry point compares the supplied accounts against
//! these derivations and rejects any difference as forgery.

use swapvault_types::{
    derivation::{associated_token_address, create_program_address, find_program_address},
    Address, CustodyRecord, EngineConfig, EscrowError, Result,
};

/// Canonical record address and bump for `(maker, nonce)`.
///
/// # Errors
/// Propagates derivation errors (practically unreachable).
pub fn record_address(
    program_id: &Address,
    maker: &Address,
    nonce: u64,
) -> Result<(Address, u8)> {
    let nonce_le = nonce.to_le_bytes();
    find_program_address(&CustodyRecord::seed_prefix(maker, &nonce_le), program_id)
}

/// Recompute a record's address from its stored maker, nonce, and bump.
///
/// # Errors
/// `InvalidSeeds` if the stored bump yields an on-curve digest.
pub fn stored_record_address(program_id: &Address, record: &CustodyRecord) -> Result<Address> {
    let nonce_le = record.nonce.to_le_bytes();
    let [tag, maker, nonce] = CustodyRecord::seed_prefix(&record.maker, &nonce_le);
    create_program_address(&[tag, maker, nonce, &[record.bump]], program_id)
}

/// The vault for `record`: its associated token account of `offered_asset`.
///
/// # Errors
/// Propagates derivation errors (practically unreachable).
pub fn vault_address(
    config: &EngineConfig,
    record: &Address,
    offered_asset: &Address,
) -> Result<Address> {
    associated_token_address(
        record,
        offered_asset,
        &config.token_program_id,
        &config.associated_token_program_id,
    )
}

/// Reject a supplied account that differs from its derivation.
///
/// # Errors
/// `AddressMismatch` naming `role`.
pub fn expect_address(role: &'static str, expected: &Address, actual: &Address) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EscrowError::AddressMismatch {
            role,
            expected: *expected,
            actual: *actual,
        })
    }
}
