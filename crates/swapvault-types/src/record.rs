//! # Custody Record: the on-ledger terms of one open trade
//!
//! ## Layout (little-endian, 121 bytes)
//!
//! ```text
//!   0      8      16               48               80               112    120 121
//!   ┌──────┬──────┬────────────────┬────────────────┬────────────────┬──────┬───┐
//!   │ disc │nonce │     maker      │ offered_asset  │requested_asset │ req  │ b │
//!   └──────┴──────┴────────────────┴────────────────┴────────────────┴──────┴───┘
//! ```
//!
//! `disc` is `SHA-256("account:Escrow")[..8]`; `b` is the derivation bump.
//!
//! ## Lifecycle
//!
//! ```text
//!   ┌───┐  make   ┌──────┐  take / refund   ┌───┐
//!   │ ∅ ├────────▶│ OPEN ├─────────────────▶│ ∅ │
//!   └───┘         └──────┘                  └───┘
//! ```
//!
//! Terms never change while the record is open. The offered amount is not
//! stored: the vault balance *is* the offered amount.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{constants, Address, EscrowError, Result};

/// Terms of one open trade, stored at the address derived from `(maker, nonce)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustodyRecord {
    /// Maker-chosen value; only used to make the record address unique.
    pub nonce: u64,
    /// The party who opened the trade.
    pub maker: Address,
    /// Mint of the asset locked in the vault.
    pub offered_asset: Address,
    /// Mint of the asset the maker wants in return.
    pub requested_asset: Address,
    /// Quantity of `requested_asset` the taker must pay.
    pub requested_amount: u64,
    /// Bump that makes the record address off-curve.
    pub bump: u8,
}

impl CustodyRecord {
    /// Discriminator width.
    pub const DISCRIMINATOR_LEN: usize = 8;

    /// Serialized size: 8 (discriminator) + 8 + 32 + 32 + 32 + 8 + 1.
    pub const LEN: usize = Self::DISCRIMINATOR_LEN + 8 + 32 + 32 + 32 + 8 + 1;

    const NONCE: usize = 8;
    const MAKER: usize = 16;
    const OFFERED: usize = 48;
    const REQUESTED: usize = 80;
    const REQUESTED_AMOUNT: usize = 112;
    const BUMP: usize = 120;

    /// Type tag prefixed to every serialized record.
    #[must_use]
    pub fn discriminator() -> [u8; 8] {
        let hash = Sha256::digest(constants::CUSTODY_RECORD_ACCOUNT_NAME.as_bytes());
        let mut out = [0u8; 8];
        out.copy_from_slice(&hash[..8]);
        out
    }

    /// Seeds (without bump) deriving this record's address.
    #[must_use]
    pub fn seed_prefix<'a>(maker: &'a Address, nonce_le: &'a [u8; 8]) -> [&'a [u8]; 3] {
        [constants::ESCROW_SEED, maker.as_bytes(), nonce_le]
    }

    /// Serialize to the fixed 121-byte layout.
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&Self::discriminator());
        data.extend_from_slice(&self.nonce.to_le_bytes());
        data.extend_from_slice(self.maker.as_bytes());
        data.extend_from_slice(self.offered_asset.as_bytes());
        data.extend_from_slice(self.requested_asset.as_bytes());
        data.extend_from_slice(&self.requested_amount.to_le_bytes());
        data.push(self.bump);
        data
    }

    /// Deserialize from the fixed layout.
    ///
    /// # Errors
    /// Returns `InvalidRecordData` on a length or discriminator mismatch.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LEN {
            return Err(EscrowError::InvalidRecordData {
                reason: format!("expected {} bytes, got {}", Self::LEN, data.len()),
            });
        }
        if data[..Self::DISCRIMINATOR_LEN] != Self::discriminator() {
            return Err(EscrowError::InvalidRecordData {
                reason: "discriminator mismatch".to_string(),
            });
        }

        Ok(Self {
            nonce: read_u64(data, Self::NONCE),
            maker: read_address(data, Self::MAKER),
            offered_asset: read_address(data, Self::OFFERED),
            requested_asset: read_address(data, Self::REQUESTED),
            requested_amount: read_u64(data, Self::REQUESTED_AMOUNT),
            bump: data[Self::BUMP],
        })
    }
}

/// Read a little-endian u64 at `offset`. Caller guarantees the length.
pub(crate) fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

/// Read a 32-byte address at `offset`. Caller guarantees the length.
pub(crate) fn read_address(data: &[u8], offset: usize) -> Address {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&data[offset..offset + 32]);
    Address(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CustodyRecord {
        CustodyRecord {
            nonce: 0x0102_0304_0506_0708,
            maker: Address([1; 32]),
            offered_asset: Address([2; 32]),
            requested_asset: Address([3; 32]),
            requested_amount: 500_000,
            bump: 254,
        }
    }

    #[test]
    fn record_is_121_bytes() {
        assert_eq!(CustodyRecord::LEN, 121);
        assert_eq!(sample().pack().len(), 121);
    }

    #[test]
    fn fields_land_at_documented_offsets() {
        let data = sample().pack();
        assert_eq!(&data[..8], &CustodyRecord::discriminator());
        assert_eq!(&data[8..16], &0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(&data[16..48], &[1u8; 32]);
        assert_eq!(&data[48..80], &[2u8; 32]);
        assert_eq!(&data[80..112], &[3u8; 32]);
        assert_eq!(&data[112..120], &500_000u64.to_le_bytes());
        assert_eq!(data[120], 254);
    }

    #[test]
    fn unpack_restores_fields() {
        let record = sample();
        assert_eq!(CustodyRecord::unpack(&record.pack()).unwrap(), record);
    }

    #[test]
    fn unpack_rejects_short_data() {
        let data = sample().pack();
        let err = CustodyRecord::unpack(&data[..120]).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidRecordData { .. }));
    }

    #[test]
    fn unpack_rejects_bad_discriminator() {
        let mut data = sample().pack();
        data[0] ^= 0xff;
        let err = CustodyRecord::unpack(&data).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidRecordData { .. }));
    }

    #[test]
    fn discriminator_is_stable() {
        assert_eq!(CustodyRecord::discriminator(), CustodyRecord::discriminator());
        assert_ne!(CustodyRecord::discriminator(), [0u8; 8]);
    }
}
