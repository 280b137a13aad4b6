//! BIP-39 style mnemonics.
//!
//! This module provides:
//! - Entropy sizing (checksum width and word count)
//! - Random mnemonic generation with an embedded SHA-256 checksum
//! - PBKDF2 seed derivation

mod entropy;
mod generator;
mod seed;

pub use entropy::{EntropyError, EntropyInfo};
pub use generator::{Mnemonic, MnemonicError, MnemonicGenerator};
pub use seed::{SeedDeriver, SEED_LEN, SEED_ROUNDS, SEED_SALT_PREFIX};
