//! # mnemonic_vanity
//!
//! Vanity address search over BIP-39 mnemonics.
//!
//! Every attempt generates a random mnemonic, stretches it into a seed,
//! walks a BIP-32 derivation path to a leaf key, and tests the Ethereum
//! address of that key against a pattern.
//!
//! ## Architecture
//!
//! - `mnemonic`: Entropy sizing, mnemonic generation and seed derivation
//! - `hd`: Derivation path parsing and the BIP-32 derivation state machine
//! - `crypto`: Address derivation from the leaf key
//! - `matcher`: Pattern matching strategies
//! - `worker`: Parallel execution and worker pool management
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod hd;
pub mod matcher;
pub mod mnemonic;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{Address, Keypair};
pub use hd::{DerivationError, DerivationPath, DerivationStep, HdDeriver, KeyState, PathError};
pub use matcher::{MatchResult, Pattern, PatternError, PatternType};
pub use mnemonic::{EntropyError, EntropyInfo, Mnemonic, MnemonicGenerator, SeedDeriver};
pub use worker::{SearchSettings, VanityResult, WorkerPool};
