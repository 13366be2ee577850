//! Transition receipts for the SwapVault audit trail.
//!
//! Every committed transition (make, take, refund) produces a [`Receipt`]
//! whose `payload_hash` commits to the trade terms and amounts moved, so it
//! can be independently re-verified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, CustodyRecord, ReceiptId};

/// The transition this receipt proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptType {
    /// A custody record was opened and the vault funded.
    Made,
    /// A taker fulfilled the trade; record and vault are gone.
    Taken,
    /// The maker cancelled and reclaimed the vault; record and vault are gone.
    Refunded,
}

impl ReceiptType {
    fn tag(self) -> u8 {
        match self {
            Self::Made => 0,
            Self::Taken => 1,
            Self::Refunded => 2,
        }
    }
}

impl std::fmt::Display for ReceiptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Made => write!(f, "MADE"),
            Self::Taken => write!(f, "TAKEN"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// Proof that a transition committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub receipt_type: ReceiptType,
    /// Address of the custody record the transition acted on.
    pub record: Address,
    /// Terms of the trade at the time of the transition.
    pub terms: CustodyRecord,
    /// Units of `terms.offered_asset` moved into (make) or out of the vault.
    pub offered_amount: u64,
    /// The taker, for `Taken` receipts.
    pub taker: Option<Address>,
    /// SHA-256 over [`Receipt::canonical_payload`].
    pub payload_hash: [u8; 32],
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    #[must_use]
    pub fn new(
        receipt_type: ReceiptType,
        record: Address,
        terms: CustodyRecord,
        offered_amount: u64,
        taker: Option<Address>,
    ) -> Self {
        let mut receipt = Self {
            id: ReceiptId::new(),
            receipt_type,
            record,
            terms,
            offered_amount,
            taker,
            payload_hash: [0u8; 32],
            issued_at: Utc::now(),
        };
        receipt.payload_hash = receipt.compute_hash();
        receipt
    }

    /// Canonical bytes hashed into `payload_hash`.
    ///
    /// Format: `"swapvault:receipt:v1:" || type || record || packed terms || offered_amount || taker?`
    #[must_use]
    pub fn canonical_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(256);
        payload.extend_from_slice(b"swapvault:receipt:v1:");
        payload.push(self.receipt_type.tag());
        payload.extend_from_slice(self.record.as_bytes());
        payload.extend_from_slice(&self.terms.pack());
        payload.extend_from_slice(&self.offered_amount.to_le_bytes());
        match self.taker {
            Some(taker) => {
                payload.push(1);
                payload.extend_from_slice(taker.as_bytes());
            }
            None => payload.push(0),
        }
        payload
    }

    fn compute_hash(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha256::digest(self.canonical_payload()));
        out
    }

    /// Whether `payload_hash` still matches the receipt contents.
    #[must_use]
    pub fn verify_hash(&self) -> bool {
        self.payload_hash == self.compute_hash()
    }
}
