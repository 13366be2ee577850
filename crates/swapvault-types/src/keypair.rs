//! Throwaway ed25519 keypairs for tests and demos. **Never use in production.**

use ed25519_dalek::{Signer, SigningKey};

use crate::Address;

/// A signing key plus the wallet address it controls.
#[derive(Debug, Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// The wallet address: the ed25519 public key bytes.
    #[must_use]
    pub fn address(&self) -> Address {
        Address(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign `message`, returning the pair the signer-verification layer expects.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> (Address, [u8; 64]) {
        (self.address(), self.signing_key.sign(message).to_bytes())
    }
}
