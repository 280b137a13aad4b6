//! Mnemonic to seed stretching (PBKDF2-HMAC-SHA512).

use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;

use super::generator::Mnemonic;

/// Salt prefix prepended to the optional passphrase.
pub const SEED_SALT_PREFIX: &str = "mnemonic";

/// PBKDF2 iteration count.
pub const SEED_ROUNDS: u32 = 2048;

/// Length of the derived seed in bytes.
pub const SEED_LEN: usize = 64;

/// Turns mnemonics into 64-byte seeds.
///
/// The salt is normalized once at construction and reused for every
/// derivation.
#[derive(Debug, Clone)]
pub struct SeedDeriver {
    salt: Vec<u8>,
}

impl Default for SeedDeriver {
    fn default() -> Self {
        Self::new("")
    }
}

impl SeedDeriver {
    /// Creates a deriver salted with `"mnemonic" + passphrase`.
    pub fn new(passphrase: &str) -> Self {
        let salt: String = format!("{SEED_SALT_PREFIX}{passphrase}").nfkd().collect();
        Self {
            salt: salt.into_bytes(),
        }
    }

    /// Returns the normalized salt bytes.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Derives the seed for a mnemonic.
    pub fn derive(&self, mnemonic: &Mnemonic) -> [u8; SEED_LEN] {
        self.derive_bytes(mnemonic.normalized().as_bytes())
    }

    /// Derives the seed from already-normalized mnemonic bytes.
    pub fn derive_bytes(&self, mnemonic: &[u8]) -> [u8; SEED_LEN] {
        let mut seed = [0u8; SEED_LEN];
        pbkdf2::pbkdf2_hmac::<Sha512>(mnemonic, &self.salt, SEED_ROUNDS, &mut seed);
        seed
    }
}
