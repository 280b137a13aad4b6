//! Pattern matching for Ethereum addresses.
//!
//! Supports multiple matching strategies:
//! - Prefix: Match at the start of the address
//! - Suffix: Match at the end of the address
//! - Contains: Match anywhere in the address
//!
//! Patterns compare hex nibbles directly against the address bytes, with
//! `x` as a single-nibble wildcard.

mod pattern;

pub use pattern::{MatchResult, Pattern, PatternError, PatternType};
