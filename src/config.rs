//! Runtime configuration for the vanity search.

use crate::hd::{DerivationPath, PathError};
use crate::matcher::{Pattern, PatternError, PatternType};
use crate::mnemonic::{EntropyError, EntropyInfo};
use crate::worker::SearchSettings;
use clap::Parser;

/// Mnemonic vanity address search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Number of worker threads (0 = number of CPU cores)
    pub threads: usize,

    /// Entropy size in bits: 128, 160, 192, 224 or 256
    pub entropy: u32,

    /// BIP-32 derivation path
    #[arg(default_value = "m/44'/60'/0'/0/0")]
    pub path: String,

    /// Pattern to search for (hex characters 0-9, a-f; x matches any nibble)
    #[arg(short, long, default_value = "1b0000")]
    pub pattern: String,

    /// Suffix pattern (when used, --pattern becomes the prefix and matching uses both)
    #[arg(short = 's', long)]
    pub suffix: Option<String>,

    /// Pattern type: prefix, suffix, or contains
    #[arg(short = 't', long, default_value = "prefix")]
    pub pattern_type: PatternType,

    /// Stop after finding N addresses (0 = run forever)
    #[arg(short = 'n', long, default_value = "0")]
    pub count: usize,

    /// Stop after trying N mnemonics across all workers (0 = unlimited)
    #[arg(short = 'm', long, default_value = "0")]
    pub max_attempts: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,

    /// Optional BIP-39 passphrase mixed into the seed
    #[arg(long, default_value = "")]
    pub passphrase: String,
}

impl Config {
    /// Returns true when the thread count is auto-selected.
    pub fn threads_auto(&self) -> bool {
        self.threads == 0
    }

    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        if self.threads_auto() {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    /// Returns the entropy layout for the requested bit length.
    pub fn entropy_info(&self) -> Result<EntropyInfo, ConfigError> {
        Ok(EntropyInfo::new(self.entropy)?)
    }

    /// Parses the derivation path.
    pub fn derivation_path(&self) -> Result<DerivationPath, ConfigError> {
        Ok(self.path.parse()?)
    }

    /// Compiles the configured pattern.
    pub fn build_pattern(&self) -> Result<Pattern, ConfigError> {
        if self.pattern.is_empty() || self.suffix.as_deref() == Some("") {
            return Err(ConfigError::EmptyPattern);
        }

        let pattern = match &self.suffix {
            Some(suffix) => Pattern::new_prefix_and_suffix(&self.pattern, suffix)?,
            None => Pattern::new(&self.pattern, self.pattern_type)?,
        };
        Ok(pattern)
    }

    /// Resolves everything the worker pool needs.
    pub fn search_settings(&self) -> Result<SearchSettings, ConfigError> {
        Ok(SearchSettings {
            threads: self.worker_count(),
            entropy: self.entropy_info()?,
            path: self.derivation_path()?,
            passphrase: self.passphrase.clone(),
            max_attempts: self.max_attempts,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.entropy_info()?;
        self.derivation_path()?;
        self.build_pattern()?;

        if self.report_interval == 0 {
            return Err(ConfigError::ReportInterval);
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("Invalid pattern: pattern cannot be empty")]
    EmptyPattern,

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Report interval must be at least one second")]
    ReportInterval,
}
