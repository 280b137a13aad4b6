//! Random mnemonic generation with an embedded checksum.

use std::fmt;

use bip39::Language;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use super::entropy::{EntropyError, EntropyInfo};

/// Errors raised while building or decoding a mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MnemonicError {
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error("Unknown mnemonic word: {0}")]
    UnknownWord(String),

    #[error("Invalid mnemonic length: {0} words")]
    BadWordCount(usize),

    #[error("Mnemonic checksum mismatch")]
    InvalidChecksum,
}

#[inline]
fn wordlist() -> &'static [&'static str; 2048] {
    Language::English.word_list()
}

/// First `checksum_bits` of SHA-256(entropy), left-aligned in a byte.
fn checksum_byte(entropy: &[u8], info: &EntropyInfo) -> u8 {
    Sha256::digest(entropy)[0] & info.checksum_mask()
}

/// Reads an 11-bit big-endian group starting at bit offset `start`.
#[inline]
fn read_word_index(data: &[u8], start: usize) -> u16 {
    (start..start + 11).fold(0u16, |acc, pos| {
        let bit = (data[pos / 8] >> (7 - pos % 8)) & 1;
        (acc << 1) | bit as u16
    })
}

/// Writes an 11-bit group at bit offset `start`.
#[inline]
fn write_word_index(data: &mut [u8], start: usize, index: u16) {
    for i in 0..11 {
        if (index >> (10 - i)) & 1 == 1 {
            let pos = start + i;
            data[pos / 8] |= 1 << (7 - pos % 8);
        }
    }
}

/// A mnemonic phrase together with the entropy it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mnemonic {
    info: EntropyInfo,
    entropy: Vec<u8>,
    indices: Vec<u16>,
}

impl Mnemonic {
    /// Builds the mnemonic for the given entropy bytes.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, MnemonicError> {
        let info = EntropyInfo::from_entropy_len(entropy.len())?;
        Ok(Self::encode(entropy.to_vec(), info))
    }

    /// Decodes a phrase and verifies its checksum.
    pub fn from_phrase(phrase: &str) -> Result<Self, MnemonicError> {
        let normalized: String = phrase.nfkd().collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let info = EntropyInfo::from_word_count(words.len())
            .ok_or(MnemonicError::BadWordCount(words.len()))?;

        let mut bits = vec![0u8; info.entropy_bytes() + 1];
        let mut indices = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            // The English list is sorted.
            let index = wordlist()
                .binary_search_by(|probe| (*probe).cmp(*word))
                .map_err(|_| MnemonicError::UnknownWord((*word).to_string()))?
                as u16;
            write_word_index(&mut bits, i * 11, index);
            indices.push(index);
        }

        let embedded = bits[info.entropy_bytes()];
        bits.truncate(info.entropy_bytes());
        if checksum_byte(&bits, &info) != embedded {
            return Err(MnemonicError::InvalidChecksum);
        }

        Ok(Self {
            info,
            entropy: bits,
            indices,
        })
    }

    fn encode(entropy: Vec<u8>, info: EntropyInfo) -> Self {
        let mut stream = Vec::with_capacity(entropy.len() + 1);
        stream.extend_from_slice(&entropy);
        stream.push(checksum_byte(&entropy, &info));

        let indices = (0..info.word_count())
            .map(|i| read_word_index(&stream, i * 11))
            .collect();

        Self {
            info,
            entropy,
            indices,
        }
    }

    /// Returns the entropy layout of this mnemonic.
    pub fn info(&self) -> &EntropyInfo {
        &self.info
    }

    /// Returns the raw entropy bytes.
    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    /// Returns the wordlist indices in phrase order.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Returns the words in phrase order.
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indices.iter().map(|&i| wordlist()[i as usize])
    }

    /// Checksum bits carried by the last word, left-aligned in a byte.
    pub fn embedded_checksum(&self) -> u8 {
        let bits = self.info.checksum_bits();
        let last = self.indices.last().copied().unwrap_or_default();
        let low = last & ((1u16 << bits) - 1);
        (low << (8 - bits)) as u8
    }

    /// Checksum recomputed from the entropy bytes.
    pub fn expected_checksum(&self) -> u8 {
        checksum_byte(&self.entropy, &self.info)
    }

    /// Returns the space-separated phrase.
    pub fn phrase(&self) -> String {
        self.words().collect::<Vec<_>>().join(" ")
    }

    /// Returns the phrase in NFKD form, as consumed by seed derivation.
    pub fn normalized(&self) -> String {
        self.phrase().nfkd().collect()
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phrase())
    }
}

/// Draws random entropy and turns it into mnemonics of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct MnemonicGenerator {
    info: EntropyInfo,
}

impl MnemonicGenerator {
    pub fn new(info: EntropyInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &EntropyInfo {
        &self.info
    }

    /// Generates a fresh mnemonic from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Mnemonic {
        let mut entropy = vec![0u8; self.info.entropy_bytes()];
        rng.fill_bytes(&mut entropy);
        Mnemonic::encode(entropy, self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_entropy_vector() {
        let mnemonic = Mnemonic::from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(
            mnemonic.phrase(),
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
    }

    #[test]
    fn test_max_entropy_vector() {
        let mnemonic = Mnemonic::from_entropy(&[0xff; 32]).unwrap();
        let words: Vec<_> = mnemonic.words().collect();
        assert_eq!(words.len(), 24);
        assert!(words[..23].iter().all(|w| *w == "zoo"));
        assert_eq!(words[23], "vote");
    }

    #[test]
    fn test_known_entropy_vector() {
        let entropy = hex::decode("7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f").unwrap();
        let mnemonic = Mnemonic::from_entropy(&entropy).unwrap();
        assert_eq!(
            mnemonic.phrase(),
            "legal winner thank year wave sausage worth useful legal winner thank yellow"
        );
    }

    #[test]
    fn test_invalid_entropy_length() {
        assert!(matches!(
            Mnemonic::from_entropy(&[0u8; 15]),
            Err(MnemonicError::Entropy(EntropyError::InvalidEntropy(120)))
        ));
    }

    #[test]
    fn test_generated_checksum_matches() {
        let mut rng = StdRng::seed_from_u64(7);
        for bits in [128, 160, 192, 224, 256] {
            let generator = MnemonicGenerator::new(EntropyInfo::new(bits).unwrap());
            for _ in 0..32 {
                let mnemonic = generator.generate(&mut rng);
                assert_eq!(mnemonic.indices().len(), generator.info().word_count());
                assert_eq!(mnemonic.entropy().len(), generator.info().entropy_bytes());
                assert_eq!(mnemonic.embedded_checksum(), mnemonic.expected_checksum());

                let decoded = Mnemonic::from_phrase(&mnemonic.phrase()).unwrap();
                assert_eq!(decoded, mnemonic);
            }
        }
    }

    #[test]
    fn test_generation_is_rng_driven() {
        let generator = MnemonicGenerator::new(EntropyInfo::new(128).unwrap());
        let a = generator.generate(&mut StdRng::seed_from_u64(1));
        let b = generator.generate(&mut StdRng::seed_from_u64(1));
        let c = generator.generate(&mut StdRng::seed_from_u64(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_phrase_rejects_bad_checksum() {
        let phrase = ["abandon"; 12].join(" ");
        assert_eq!(
            Mnemonic::from_phrase(&phrase),
            Err(MnemonicError::InvalidChecksum)
        );
    }

    #[test]
    fn test_from_phrase_rejects_unknown_word() {
        let phrase = format!("{} abcdef", ["abandon"; 11].join(" "));
        assert_eq!(
            Mnemonic::from_phrase(&phrase),
            Err(MnemonicError::UnknownWord("abcdef".into()))
        );
    }

    #[test]
    fn test_from_phrase_rejects_word_count() {
        assert_eq!(
            Mnemonic::from_phrase("abandon about"),
            Err(MnemonicError::BadWordCount(2))
        );
    }
}
