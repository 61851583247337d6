//! SSH credential generation

use crate::error::{ProvisionError, Result};
use ssh_key::rand_core::OsRng;
use ssh_key::{Algorithm, LineEnding, PrivateKey};
use std::fmt;

/// A freshly generated access key pair
///
/// The private half only ever leaves the process through the run summary.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// OpenSSH `authorized_keys` line
    pub public_key: String,
    /// OpenSSH PEM-encoded private key
    pub private_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"***")
            .finish()
    }
}

/// Source of key pairs
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> Result<KeyPair>;
}

/// Ed25519 keys from the operating system RNG
#[derive(Debug, Clone)]
pub struct Ed25519KeyGenerator {
    comment: String,
}

impl Ed25519KeyGenerator {
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
        }
    }
}

impl Default for Ed25519KeyGenerator {
    fn default() -> Self {
        Self::new("fleetgate")
    }
}

impl KeyGenerator for Ed25519KeyGenerator {
    fn generate(&self) -> Result<KeyPair> {
        let private_key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
            .map_err(|e| ProvisionError::KeyGeneration(e.to_string()))?;

        let private_pem = private_key
            .to_openssh(LineEnding::LF)
            .map_err(|e| ProvisionError::KeyGeneration(e.to_string()))?
            .to_string();
        let public_openssh = private_key
            .public_key()
            .to_openssh()
            .map_err(|e| ProvisionError::KeyGeneration(e.to_string()))?;

        Ok(KeyPair {
            public_key: format!("{} {}", public_openssh, self.comment),
            private_key: private_pem,
        })
    }
}
