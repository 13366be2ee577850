//! Token substrate layouts: mints and token accounts.
//!
//! These belong to the token program, not to the escrow engine. The engine
//! reads them to check asset identity and ownership, and treats `amount` as an
//! opaque counter that only the token program mutates.

use serde::{Deserialize, Serialize};

use crate::{
    record::{read_address, read_u64},
    Address, EscrowError, Result,
};

/// A token-holding account: `amount` units of `mint`, spendable by `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    /// Asset identity.
    pub mint: Address,
    /// Authority allowed to debit or close this account.
    pub owner: Address,
    /// Balance in base units.
    pub amount: u64,
}

impl TokenAccount {
    /// Serialized size: 32 (mint) + 32 (owner) + 8 (amount).
    pub const LEN: usize = 72;

    /// Offset of the little-endian balance counter.
    pub const AMOUNT_OFFSET: usize = 64;

    #[must_use]
    pub fn new(mint: Address, owner: Address) -> Self {
        Self {
            mint,
            owner,
            amount: 0,
        }
    }

    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(self.mint.as_bytes());
        data.extend_from_slice(self.owner.as_bytes());
        data.extend_from_slice(&self.amount.to_le_bytes());
        data
    }

    /// # Errors
    /// Returns `InvalidAccountData` if `data` is not exactly [`Self::LEN`] bytes.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LEN {
            return Err(EscrowError::InvalidAccountData {
                reason: format!("token account must be {} bytes, got {}", Self::LEN, data.len()),
            });
        }
        Ok(Self {
            mint: read_address(data, 0),
            owner: read_address(data, 32),
            amount: read_u64(data, Self::AMOUNT_OFFSET),
        })
    }
}

/// An asset definition. Its address is the asset identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Total units in circulation across all token accounts of this mint.
    pub supply: u64,
    /// Display precision.
    pub decimals: u8,
    pub is_initialized: bool,
}

impl Mint {
    /// Serialized size: 8 (supply) + 1 (decimals) + 1 (initialized flag).
    pub const LEN: usize = 10;

    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&self.supply.to_le_bytes());
        data.push(self.decimals);
        data.push(u8::from(self.is_initialized));
        data
    }

    /// # Errors
    /// Returns `InvalidAccountData` on a length mismatch or an uninitialized mint.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LEN {
            return Err(EscrowError::InvalidAccountData {
                reason: format!("mint must be {} bytes, got {}", Self::LEN, data.len()),
            });
        }
        let mint = Self {
            supply: read_u64(data, 0),
            decimals: data[8],
            is_initialized: data[9] != 0,
        };
        if !mint.is_initialized {
            return Err(EscrowError::InvalidAccountData {
                reason: "mint is not initialized".to_string(),
            });
        }
        Ok(mint)
    }
}
