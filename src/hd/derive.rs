//! BIP-32 private child derivation.
//!
//! Starting from `I = HMAC-SHA512(label, seed)`, each step computes
//! `I' = HMAC-SHA512(chain_code, data || ser32(i))` where `data` is
//! `0x00 || ser256(k)` for hardened steps and the compressed public key
//! for normal steps. The child key is `(IL + k) mod n`; an `IL >= n` or a
//! zero child invalidates the whole chain.
//!
//! Rejecting `IL >= n` is stricter than plain modular reduction, which only
//! refuses a zero child. The two differ with probability around 2^-127.

use hmac::{Hmac, Mac};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;

use super::path::{DerivationPath, DerivationStep};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key used for the master node.
pub const MASTER_KEY_LABEL: &str = "Bitcoin seed";

/// Errors raised while walking a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    /// The scalar for the node at `index` (`None` for master) fell outside `[1, n)`.
    #[error(
        "Derived private key out of range at {}",
        .index.map_or_else(|| "master".to_string(), |i| format!("index {i:#010x}"))
    )]
    InvalidPrivateKey { index: Option<u32> },
}

/// A private key together with its chain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    secret_key: SecretKey,
    chain_code: [u8; 32],
}

impl KeyState {
    pub fn new(secret_key: SecretKey, chain_code: [u8; 32]) -> Self {
        Self {
            secret_key,
            chain_code,
        }
    }

    #[inline]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    #[inline]
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Big-endian private key bytes.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }
}

fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

fn split(i: [u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&i[..32]);
    ir.copy_from_slice(&i[32..]);
    (il, ir)
}

/// Computes `(il + key) mod n`, rejecting `il >= n` and a zero sum.
fn add_mod_order(key: &SecretKey, il: [u8; 32], index: u32) -> Result<SecretKey, DerivationError> {
    let invalid = DerivationError::InvalidPrivateKey { index: Some(index) };
    let tweak = Scalar::from_be_bytes(il).map_err(|_| invalid)?;
    key.add_tweak(&tweak).map_err(|_| invalid)
}

/// Walks derivation paths from a seed to a leaf key.
///
/// Holds its own secp256k1 context, so one deriver per worker thread.
#[derive(Debug, Clone)]
pub struct HdDeriver {
    secp: Secp256k1<All>,
    master_label: Vec<u8>,
}

impl Default for HdDeriver {
    fn default() -> Self {
        Self::new(MASTER_KEY_LABEL)
    }
}

impl HdDeriver {
    /// Creates a deriver whose master HMAC is keyed with `master_label`.
    pub fn new(master_label: &str) -> Self {
        let label: String = master_label.nfkd().collect();
        Self {
            secp: Secp256k1::new(),
            master_label: label.into_bytes(),
        }
    }

    /// The secp256k1 context used for public key computation.
    pub fn context(&self) -> &Secp256k1<All> {
        &self.secp
    }

    /// Computes the master node for `seed`.
    pub fn master(&self, seed: &[u8]) -> Result<KeyState, DerivationError> {
        let (il, ir) = split(hmac_sha512(&self.master_label, seed));
        let secret_key = SecretKey::from_slice(&il)
            .map_err(|_| DerivationError::InvalidPrivateKey { index: None })?;
        Ok(KeyState::new(secret_key, ir))
    }

    /// HMAC message for a child step.
    fn child_message(&self, parent: &KeyState, step: &DerivationStep) -> [u8; 37] {
        let mut data = [0u8; 37];
        if step.is_hardened() {
            data[1..33].copy_from_slice(&parent.private_key_bytes());
        } else {
            let public_key = PublicKey::from_secret_key(&self.secp, &parent.secret_key);
            data[..33].copy_from_slice(&public_key.serialize());
        }
        data[33..].copy_from_slice(&step.serialized());
        data
    }

    /// Derives one child from `parent`.
    pub fn derive_child(
        &self,
        parent: &KeyState,
        step: &DerivationStep,
    ) -> Result<KeyState, DerivationError> {
        let data = self.child_message(parent, step);
        let (il, ir) = split(hmac_sha512(&parent.chain_code, &data));
        let secret_key = add_mod_order(&parent.secret_key, il, step.index())?;
        Ok(KeyState::new(secret_key, ir))
    }

    /// Derives the leaf node of `path` from `seed`.
    ///
    /// Any out-of-range intermediate key aborts the whole derivation.
    pub fn derive(&self, seed: &[u8], path: &DerivationPath) -> Result<KeyState, DerivationError> {
        let master = self.master(seed)?;
        path.iter()
            .try_fold(master, |state, step| self.derive_child(&state, step))
    }
}
