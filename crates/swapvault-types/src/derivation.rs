//! Program-derived addresses.
//!
//! A derived address is `SHA-256(seeds ‖ program_id ‖ "ProgramDerivedAddress")`,
//! accepted only when the digest does **not** decode as an ed25519 public key.
//! No private key exists for such an address, so nothing outside the owning
//! program's logic can ever authorize for it.
//!
//! [`find_program_address`] searches bumps from 255 downward and returns the
//! first off-curve address together with the bump that produced it. The bump
//! is stored alongside the data so any verifier can recompute the address with
//! a single [`create_program_address`] call.

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::{
    constants::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER},
    Address, EscrowError, Result,
};

/// Whether the 32 bytes decode to a point on the ed25519 curve,
/// i.e. whether some private key could sign for this address.
#[must_use]
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

/// Compute the derived address for `seeds` (bump included) under `program_id`.
///
/// # Errors
/// Returns `InvalidSeeds` if there are too many seeds, a seed is longer than
/// 32 bytes, or the digest lands on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<Address> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(EscrowError::InvalidSeeds);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());

    if is_on_curve(&out) {
        return Err(EscrowError::InvalidSeeds);
    }
    Ok(Address(out))
}

/// Find the canonical derived address for `seeds` under `program_id`.
///
/// # Errors
/// - `InvalidSeeds` if the seeds leave no room for the bump or are too long
/// - `NoViableBump` if every bump lands on the curve (probability ~2^-256)
pub fn find_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<(Address, u8)> {
    if seeds.len() >= MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(EscrowError::InvalidSeeds);
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);
        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(EscrowError::InvalidSeeds) => {}
            Err(other) => return Err(other),
        }
    }
    Err(EscrowError::NoViableBump)
}

/// Associated token account address for `(owner, mint)`.
///
/// Seeds `[owner, token_program_id, mint]` under `associated_token_program_id`.
///
/// # Errors
/// Propagates [`find_program_address`] errors (practically unreachable).
pub fn associated_token_address(
    owner: &Address,
    mint: &Address,
    token_program_id: &Address,
    associated_token_program_id: &Address,
) -> Result<Address> {
    let (address, _) = find_program_address(
        &[owner.as_bytes(), token_program_id.as_bytes(), mint.as_bytes()],
        associated_token_program_id,
    )?;
    Ok(address)
}
