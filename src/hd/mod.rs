//! Hierarchical deterministic key derivation (BIP-32, private keys only).

mod derive;
mod path;

pub use derive::{DerivationError, HdDeriver, KeyState, MASTER_KEY_LABEL};
pub use path::{DerivationPath, DerivationStep, PathError, HARDENED_OFFSET};
