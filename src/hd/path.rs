//! Derivation path parsing.

use std::fmt;
use std::str::FromStr;

/// Offset added to hardened child indices.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Errors raised while parsing a derivation path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Invalid derivation path: {0:?} (expected m/<index>[/<index>...])")]
    InvalidPath(String),

    #[error("Invalid derivation segment: {0:?}")]
    InvalidSegment(String),
}

/// A single child derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationStep {
    index: u32,
}

impl DerivationStep {
    pub const fn new(index: u32) -> Self {
        Self { index }
    }

    pub const fn hardened(index: u32) -> Self {
        Self {
            index: index | HARDENED_OFFSET,
        }
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn is_hardened(&self) -> bool {
        self.index >= HARDENED_OFFSET
    }

    /// Big-endian index bytes, as fed to the child HMAC.
    #[inline]
    pub const fn serialized(&self) -> [u8; 4] {
        self.index.to_be_bytes()
    }
}

impl fmt::Display for DerivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index - HARDENED_OFFSET)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

impl FromStr for DerivationStep {
    type Err = PathError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let marker = |c: char| matches!(c, '\'' | 'h' | 'H');
        let (digits, hardened) = match segment.strip_suffix(marker) {
            Some(rest) => (rest, true),
            None => (segment, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::InvalidSegment(segment.to_string()));
        }

        let index: u32 = digits
            .parse()
            .ok()
            .filter(|&i| i < HARDENED_OFFSET)
            .ok_or_else(|| PathError::InvalidSegment(segment.to_string()))?;

        Ok(if hardened {
            Self::hardened(index)
        } else {
            Self::new(index)
        })
    }
}

/// A non-empty sequence of steps rooted at the master key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    steps: Vec<DerivationStep>,
}

impl DerivationPath {
    /// The standard Ethereum account path, m/44'/60'/0'/0/0.
    pub fn ethereum() -> Self {
        Self {
            steps: vec![
                DerivationStep::hardened(44),
                DerivationStep::hardened(60),
                DerivationStep::hardened(0),
                DerivationStep::new(0),
                DerivationStep::new(0),
            ],
        }
    }

    /// Builds a path from explicit steps.
    pub fn from_steps(steps: Vec<DerivationStep>) -> Option<Self> {
        (!steps.is_empty()).then_some(Self { steps })
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The last (leaf) step.
    pub fn terminal(&self) -> &DerivationStep {
        // Construction guarantees at least one step.
        &self.steps[self.steps.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivationStep> {
        self.steps.iter()
    }

    /// Space-separated `0xXXXXXXXX` rendering of each serialized index.
    pub fn serialized_hex(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("0x{}", hex::encode_upper(s.serialized())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let mut segments = path.split('/');
        if segments.next() != Some("m") {
            return Err(PathError::InvalidPath(path.to_string()));
        }

        let steps = segments
            .map(DerivationStep::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_steps(steps).ok_or_else(|| PathError::InvalidPath(path.to_string()))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}
