use crate::error::{LedgerError, Result};
use earn_types::AccountAddress;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Platform-held signing key for the funding account. Injected once at
/// startup and shared by reference; never read from process globals.
pub struct CustodialSigner {
    signing_key: SigningKey,
}

impl CustodialSigner {
    /// Load the key from a 32-byte hex-encoded seed.
    pub fn from_secret_hex(secret: &str) -> Result<Self> {
        let bytes = hex::decode(secret.trim())
            .map_err(|e| LedgerError::Signing(format!("secret is not valid hex: {}", e)))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::Signing("secret must be 32 bytes".to_string()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Fresh random key, for tests and local networks.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> AccountAddress {
        AccountAddress::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self.signing_key.sign(payload).to_bytes().to_vec()
    }
}

impl fmt::Debug for CustodialSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "CustodialSigner({:?})", self.public_key())
    }
}
