//! Signer sets: the identities that authorized a transaction.
//!
//! Building and signing transactions happens outside the engine; what arrives
//! here is a message plus `(public key, signature)` pairs. [`Signers::verify`]
//! checks every pair with ed25519 and keeps the verified identities.
//!
//! Derived addresses never parse as ed25519 public keys, so they can never end
//! up in a `Signers` set. They can only sign from inside a transaction via
//! [`crate::Transaction::sign_with_seeds`].

use std::collections::BTreeSet;

use ed25519_dalek::{Signature, VerifyingKey};
use swapvault_types::{derivation::is_on_curve, Address, EscrowError, Result};

/// Verified set of signing identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signers {
    keys: BTreeSet<Address>,
}

impl Signers {
    /// Verify ed25519 signatures over `message` and collect the signers.
    ///
    /// # Errors
    /// - `InvalidSigner` if an address is not a valid ed25519 public key
    /// - `InvalidSignature` if a signature does not verify
    pub fn verify(message: &[u8], signatures: &[(Address, [u8; 64])]) -> Result<Self> {
        let mut keys = BTreeSet::new();
        for (address, signature) in signatures {
            let key = VerifyingKey::from_bytes(address.as_bytes())
                .map_err(|_| EscrowError::InvalidSigner(*address))?;
            let signature = Signature::from_bytes(signature);
            key.verify_strict(message, &signature)
                .map_err(|_| EscrowError::InvalidSignature(*address))?;
            keys.insert(*address);
        }
        Ok(Self { keys })
    }

    /// Accept identities whose signatures were already checked by the
    /// submission layer.
    ///
    /// # Errors
    /// Returns `InvalidSigner` for any off-curve (derived) address.
    pub fn pre_verified(addresses: impl IntoIterator<Item = Address>) -> Result<Self> {
        let mut keys = BTreeSet::new();
        for address in addresses {
            if !is_on_curve(address.as_bytes()) {
                return Err(EscrowError::InvalidSigner(address));
            }
            keys.insert(address);
        }
        Ok(Self { keys })
    }

    /// Insert without a curve check. Unit tests use fixed byte patterns as
    /// wallet addresses.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, address: Address) {
        self.keys.insert(address);
    }

    #[must_use]
    pub fn contains(&self, address: &Address) -> bool {
        self.keys.contains(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.keys.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
