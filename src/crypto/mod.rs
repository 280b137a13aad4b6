//! Address derivation for Ethereum keys.
//!
//! This module provides:
//! - Ethereum address derivation using Keccak-256
//! - Leaf keypair management

mod address;
mod keypair;

pub use address::{keccak256, Address};
pub use keypair::Keypair;
