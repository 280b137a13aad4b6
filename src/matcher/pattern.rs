//! Pattern matching implementation.

use std::str::FromStr;

use crate::crypto::Address;

/// Number of hex nibbles in an address.
const ADDRESS_NIBBLES: usize = 40;

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("unexpected character {0:?} (expected 0-9, a-f, or x as a wildcard)")]
    InvalidChar(char),

    #[error("{0} nibbles is longer than an address (40)")]
    TooLong(usize),
}

/// The type of pattern matching to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternType {
    /// Match at the beginning of the address
    #[default]
    Prefix,
    /// Match at the end of the address
    Suffix,
    /// Match anywhere in the address
    Contains,
    /// Match both prefix and suffix
    PrefixAndSuffix,
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" | "start" | "begin" => Ok(PatternType::Prefix),
            "suffix" | "end" => Ok(PatternType::Suffix),
            "contains" | "anywhere" | "any" => Ok(PatternType::Contains),
            "prefixandsuffix" | "both" => Ok(PatternType::PrefixAndSuffix),
            _ => Err(format!("Unknown pattern type: {}", s)),
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternType::Prefix => write!(f, "prefix"),
            PatternType::Suffix => write!(f, "suffix"),
            PatternType::Contains => write!(f, "contains"),
            PatternType::PrefixAndSuffix => write!(f, "prefix+suffix"),
        }
    }
}

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// Compiles a hex pattern into nibbles; `None` is a wildcard.
fn compile(pattern: &str) -> Result<Vec<Option<u8>>, PatternError> {
    let nibbles = pattern
        .chars()
        .map(|c| match c {
            'x' | 'X' => Ok(None),
            _ => c
                .to_digit(16)
                .map(|d| Some(d as u8))
                .ok_or(PatternError::InvalidChar(c)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if nibbles.len() > ADDRESS_NIBBLES {
        return Err(PatternError::TooLong(nibbles.len()));
    }
    Ok(nibbles)
}

/// Checks `nibbles` against the address starting at nibble `offset`.
#[inline]
fn matches_at(address: &Address, nibbles: &[Option<u8>], offset: usize) -> bool {
    nibbles
        .iter()
        .enumerate()
        .all(|(i, n)| n.map_or(true, |v| address.nibble(offset + i) == v))
}

/// A compiled pattern for efficient matching.
///
/// Patterns are case-insensitive hex; `x` matches any nibble, so
/// `xxxx1b` pins the third byte to `0x1b`.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The pattern string (normalized)
    pattern: String,
    nibbles: Vec<Option<u8>>,
    /// Optional suffix pattern for PrefixAndSuffix mode
    suffix: Option<String>,
    suffix_nibbles: Vec<Option<u8>>,
    /// The pattern type
    pattern_type: PatternType,
}

impl Pattern {
    /// Creates a new pattern.
    pub fn new(
        pattern: impl Into<String>,
        pattern_type: PatternType,
    ) -> Result<Self, PatternError> {
        let pattern = pattern.into().to_lowercase();
        let nibbles = compile(&pattern)?;

        Ok(Self {
            pattern,
            nibbles,
            suffix: None,
            suffix_nibbles: Vec::new(),
            pattern_type,
        })
    }

    /// Creates a new prefix+suffix pattern.
    pub fn new_prefix_and_suffix(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self, PatternError> {
        let prefix = prefix.into().to_lowercase();
        let suffix = suffix.into().to_lowercase();
        let nibbles = compile(&prefix)?;
        let suffix_nibbles = compile(&suffix)?;

        let total = nibbles.len() + suffix_nibbles.len();
        if total > ADDRESS_NIBBLES {
            return Err(PatternError::TooLong(total));
        }

        Ok(Self {
            pattern: prefix,
            nibbles,
            suffix: Some(suffix),
            suffix_nibbles,
            pattern_type: PatternType::PrefixAndSuffix,
        })
    }

    /// Returns the pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the suffix pattern, if any.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Returns the pattern type.
    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    /// Matches an address against this pattern.
    #[inline]
    pub fn matches(&self, address: &Address) -> MatchResult {
        let len = self.nibbles.len();
        let matched = match self.pattern_type {
            PatternType::Prefix => matches_at(address, &self.nibbles, 0),
            PatternType::Suffix => matches_at(address, &self.nibbles, ADDRESS_NIBBLES - len),
            PatternType::Contains => {
                (0..=ADDRESS_NIBBLES - len).any(|offset| matches_at(address, &self.nibbles, offset))
            }
            PatternType::PrefixAndSuffix => {
                let suffix_offset = ADDRESS_NIBBLES - self.suffix_nibbles.len();
                matches_at(address, &self.nibbles, 0)
                    && matches_at(address, &self.suffix_nibbles, suffix_offset)
            }
        };

        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// For hex patterns:
    /// - Each fixed character has 16 possible values
    /// - Wildcards do not contribute
    /// - Expected attempts = 16^n where n is the number of fixed nibbles
    pub fn estimated_difficulty(&self) -> u64 {
        let fixed = self
            .nibbles
            .iter()
            .chain(self.suffix_nibbles.iter())
            .filter(|n| n.is_some())
            .count();
        16u64.saturating_pow(fixed as u32)
    }

    /// Returns a human-readable difficulty estimate.
    ///
    /// Each attempt runs a full PBKDF2 stretch, so thresholds sit far
    /// lower than for raw key generation.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=256 => "Very Easy (seconds)".into(),
            257..=65_536 => "Easy (minutes)".into(),
            65_537..=16_777_216 => "Medium (hours)".into(),
            16_777_217..=4_294_967_296 => "Hard (days)".into(),
            _ => "Very Hard (months or more)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_address(hex_str: &str) -> Address {
        let bytes: [u8; 20] = hex::decode(hex_str).unwrap().try_into().unwrap();
        Address::from_bytes(bytes)
    }

    #[test]
    fn test_prefix_match() {
        let pattern = Pattern::new("1b0000", PatternType::Prefix).unwrap();
        let addr = make_address("1b00000000000000000000000000000000000000");
        assert!(pattern.matches(&addr).is_match());
        let addr = make_address("1b0000ffffffffffffffffffffffffffffffffff");
        assert!(pattern.matches(&addr).is_match());
    }

    #[test]
    fn test_prefix_no_match() {
        let pattern = Pattern::new("1b0000", PatternType::Prefix).unwrap();
        for hex_str in [
            "1c00000000000000000000000000000000000000",
            "1b01000000000000000000000000000000000000",
            "1b00010000000000000000000000000000000000",
            "001b000000000000000000000000000000000000",
        ] {
            assert!(
                !pattern.matches(&make_address(hex_str)).is_match(),
                "{hex_str}"
            );
        }
    }

    #[test]
    fn test_suffix_match() {
        let pattern = Pattern::new("BEEF", PatternType::Suffix).unwrap();
        let addr = make_address("0000000000000000000000000000000000debeef");
        assert!(pattern.matches(&addr).is_match());
    }

    #[test]
    fn test_contains_match() {
        let pattern = Pattern::new("cafe", PatternType::Contains).unwrap();
        // 20 bytes = 40 hex chars: 18 zeros + cafe + 18 zeros = 36 + 4 = 40
        let addr = make_address("000000000000000000cafe000000000000000000");
        assert!(pattern.matches(&addr).is_match());
        let addr = make_address("00000000000000000000000000000000000cafe0");
        assert!(pattern.matches(&addr).is_match());
        let addr = make_address("0000000000000000000000000000000000000caf");
        assert!(!pattern.matches(&addr).is_match());
    }

    #[test]
    fn test_prefix_and_suffix() {
        let pattern = Pattern::new_prefix_and_suffix("dead", "beef").unwrap();
        assert!(pattern
            .matches(&make_address("dead00000000000000000000000000000000beef"))
            .is_match());
        assert!(!pattern
            .matches(&make_address("dead00000000000000000000000000000000beee"))
            .is_match());
    }

    #[test]
    fn test_wildcard_offsets() {
        let pattern = Pattern::new("xxxx1b", PatternType::Prefix).unwrap();
        assert!(pattern
            .matches(&make_address("abcd1b0000000000000000000000000000000000"))
            .is_match());
        assert!(!pattern
            .matches(&make_address("1b00000000000000000000000000000000000000"))
            .is_match());
        assert_eq!(pattern.estimated_difficulty(), 256);
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let pattern = Pattern::new("", PatternType::Prefix).unwrap();
        let addr = make_address("ffffffffffffffffffffffffffffffffffffffff");
        assert!(pattern.matches(&addr).is_match());
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            Pattern::new("xyz", PatternType::Prefix).unwrap_err(),
            PatternError::InvalidChar('y')
        );
        assert_eq!(
            Pattern::new("0".repeat(41), PatternType::Prefix).unwrap_err(),
            PatternError::TooLong(41)
        );
        assert_eq!(
            Pattern::new_prefix_and_suffix("0".repeat(30), "1".repeat(11)).unwrap_err(),
            PatternError::TooLong(41)
        );
    }

    #[test]
    fn test_difficulty() {
        let pattern = Pattern::new("dead", PatternType::Prefix).unwrap();
        assert_eq!(pattern.estimated_difficulty(), 65536); // 16^4
        assert_eq!(pattern.difficulty_description(), "Easy (minutes)");
    }
}
