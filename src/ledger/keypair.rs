//! Workflow identities and transaction signing.
//!
//! # Security
//! - Keypairs are generated in-process and live only in memory
//! - Secret keys are never logged or serialized
//! - Each identity is owned by the workflow run that created it

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

/// A public/secret keypair identifying one ledger account.
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Generate a fresh identity from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// The account id: hex-encoded 32-byte public key.
    pub fn account_id(&self) -> String {
        hex::encode(self.verifying_key().as_bytes())
    }

    /// The raw public key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Last four bytes of the public key, used as a signature hint so a
    /// verifier can pick the matching signer without trying every key.
    pub fn signature_hint(&self) -> [u8; 4] {
        let bytes = self.verifying_key().to_bytes();
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&bytes[28..32]);
        hint
    }

    /// Produce a detached 64-byte signature over a payload hash.
    pub fn sign(&self, payload: &[u8]) -> [u8; 64] {
        self.signing_key.sign(payload).to_bytes()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("account_id", &self.account_id())
            .finish_non_exhaustive()
    }
}
