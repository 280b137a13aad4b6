//! Entropy sizing for mnemonic generation.

/// Errors raised while sizing the entropy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntropyError {
    #[error("Invalid entropy: {0} bits (must be a multiple of 32 between 128 and 256)")]
    InvalidEntropy(u32),
}

/// Entropy width, checksum width, and resulting word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntropyInfo {
    entropy_bits: u32,
    checksum_bits: u32,
    word_count: usize,
}

impl EntropyInfo {
    /// Bits carried by each mnemonic word.
    pub const BITS_PER_WORD: u32 = 11;

    /// Computes the layout for `entropy_bits` of entropy.
    pub fn new(entropy_bits: u32) -> Result<Self, EntropyError> {
        if !(128..=256).contains(&entropy_bits) || entropy_bits % 32 != 0 {
            return Err(EntropyError::InvalidEntropy(entropy_bits));
        }

        let checksum_bits = entropy_bits / 32;
        let word_count = ((entropy_bits + checksum_bits) / Self::BITS_PER_WORD) as usize;

        Ok(Self {
            entropy_bits,
            checksum_bits,
            word_count,
        })
    }

    /// Derives the layout from a raw entropy byte length.
    pub fn from_entropy_len(len: usize) -> Result<Self, EntropyError> {
        let bits = u32::try_from(len * 8).unwrap_or(u32::MAX);
        Self::new(bits)
    }

    /// Derives the layout from a mnemonic word count.
    pub fn from_word_count(words: usize) -> Option<Self> {
        [128, 160, 192, 224, 256]
            .into_iter()
            .filter_map(|bits| Self::new(bits).ok())
            .find(|info| info.word_count == words)
    }

    #[inline]
    pub fn entropy_bits(&self) -> u32 {
        self.entropy_bits
    }

    #[inline]
    pub fn entropy_bytes(&self) -> usize {
        (self.entropy_bits / 8) as usize
    }

    #[inline]
    pub fn checksum_bits(&self) -> u32 {
        self.checksum_bits
    }

    /// Mask selecting the checksum bits from the first hash byte.
    #[inline]
    pub fn checksum_mask(&self) -> u8 {
        (((1u16 << self.checksum_bits) - 1) << (8 - self.checksum_bits)) as u8
    }

    #[inline]
    pub fn total_bits(&self) -> u32 {
        self.entropy_bits + self.checksum_bits
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_count
    }
}
