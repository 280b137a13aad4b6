//! Leaf keypairs (private key + derived address).

use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};

use crate::hd::KeyState;

use super::Address;

/// A leaf private key and its Ethereum address.
#[derive(Debug, Clone)]
pub struct Keypair {
    /// The private key bytes (32 bytes)
    secret_key: [u8; 32],
    /// The derived Ethereum address
    address: Address,
}

impl Keypair {
    /// Builds the keypair for a secret key.
    #[inline]
    pub fn from_secret_key<C: Signing>(secp: &Secp256k1<C>, secret_key: &SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(secp, secret_key);

        Self {
            secret_key: secret_key.secret_bytes(),
            address: Address::from_public_key(&public_key),
        }
    }

    /// Builds the keypair for the leaf of a derivation.
    #[inline]
    pub fn from_key_state<C: Signing>(secp: &Secp256k1<C>, state: &KeyState) -> Self {
        Self::from_secret_key(secp, state.secret_key())
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}
