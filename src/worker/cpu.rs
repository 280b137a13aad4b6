//! CPU worker running the mnemonic search loop.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::crypto::Keypair;
use crate::hd::{DerivationError, DerivationPath, HdDeriver, KeyState};
use crate::matcher::Pattern;
use crate::mnemonic::{Mnemonic, MnemonicGenerator, SeedDeriver};

use super::{SearchSettings, VanityResult};

/// How long a blocked send waits before re-checking the stop flag.
const SEND_RETRY: Duration = Duration::from_millis(50);

/// Statistics shared by all workers of a pool.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Mnemonics generated and tested
    pub attempts: AtomicU64,
    /// Attempts discarded because a derived key fell outside the curve order
    pub invalid_keys: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
    /// Workers that entered their search loop
    pub workers_started: AtomicUsize,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total mnemonics tried.
    pub fn total_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Returns the total attempts discarded for invalid keys.
    pub fn total_invalid_keys(&self) -> u64 {
        self.invalid_keys.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }

    /// Returns how many workers have started.
    pub fn started_workers(&self) -> usize {
        self.workers_started.load(Ordering::Relaxed)
    }

    /// Claims one attempt, unless `max_attempts` (when non-zero) is used up.
    fn claim_attempt(&self, max_attempts: u64) -> bool {
        self.attempts
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (max_attempts == 0 || n < max_attempts).then_some(n + 1)
            })
            .is_ok()
    }
}

/// A CPU worker that generates mnemonics and tests their leaf addresses.
///
/// Every worker owns its derivers (and with them a secp256k1 context and
/// the normalized salt), so nothing cryptographic is shared between threads.
pub struct SearchWorker {
    /// Worker ID
    id: usize,
    generator: MnemonicGenerator,
    seed_deriver: SeedDeriver,
    deriver: HdDeriver,
    path: Arc<DerivationPath>,
    /// The pattern to match against
    pattern: Pattern,
    /// Zero means unlimited
    max_attempts: u64,
    /// Channel to send results
    result_tx: Sender<VanityResult>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl SearchWorker {
    /// Creates a new search worker.
    pub fn new(
        id: usize,
        settings: &SearchSettings,
        path: Arc<DerivationPath>,
        pattern: Pattern,
        result_tx: Sender<VanityResult>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            generator: MnemonicGenerator::new(settings.entropy),
            seed_deriver: SeedDeriver::new(&settings.passphrase),
            deriver: HdDeriver::default(),
            path,
            pattern,
            max_attempts: settings.max_attempts,
            result_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop with the thread-local CSPRNG.
    pub fn run(&self) {
        self.run_with_rng(&mut rand::thread_rng());
    }

    /// Runs the worker loop.
    ///
    /// Generates mnemonics and tests them against the pattern until:
    /// - Stop flag is set
    /// - The shared attempt budget is spent
    /// - Channel is closed
    pub fn run_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) {
        self.run_loop(rng, |mnemonic| self.derive_leaf(mnemonic));
    }

    fn run_loop<R, F>(&self, rng: &mut R, mut derive_leaf: F)
    where
        R: RngCore + CryptoRng,
        F: FnMut(&Mnemonic) -> Result<KeyState, DerivationError>,
    {
        self.stats.workers_started.fetch_add(1, Ordering::Relaxed);
        debug!(worker = self.id, "search worker started");

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                break;
            }

            if !self.stats.claim_attempt(self.max_attempts) {
                break;
            }

            let mnemonic = self.generator.generate(rng);
            let leaf = derive_leaf(&mnemonic);
            if let Some(result) = self.evaluate(&mnemonic, leaf) {
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                if !self.deliver(result) {
                    break;
                }
            }
        }

        debug!(worker = self.id, "search worker stopped");
    }

    /// Runs one mnemonic through seed, derivation and address matching.
    pub fn try_mnemonic(&self, mnemonic: &Mnemonic) -> Option<VanityResult> {
        self.evaluate(mnemonic, self.derive_leaf(mnemonic))
    }

    fn derive_leaf(&self, mnemonic: &Mnemonic) -> Result<KeyState, DerivationError> {
        let seed = self.seed_deriver.derive(mnemonic);
        self.deriver.derive(&seed, &self.path)
    }

    /// Tests a derived leaf against the pattern.
    ///
    /// Returns `None` on a miss, and also when the derivation hit an
    /// out-of-range key; that attempt is counted and dropped.
    fn evaluate(
        &self,
        mnemonic: &Mnemonic,
        leaf: Result<KeyState, DerivationError>,
    ) -> Option<VanityResult> {
        let leaf = match leaf {
            Ok(leaf) => leaf,
            Err(e) => {
                self.stats.invalid_keys.fetch_add(1, Ordering::Relaxed);
                debug!(worker = self.id, error = %e, "discarding mnemonic");
                return None;
            }
        };

        let keypair = Keypair::from_key_state(self.deriver.context(), &leaf);
        if !self.pattern.matches(keypair.address()).is_match() {
            return None;
        }

        Some(VanityResult {
            address: *keypair.address(),
            mnemonic: mnemonic.phrase(),
            private_key: keypair.private_key_hex(),
            worker_id: self.id,
        })
    }

    /// Sends a result, giving up once stopped or disconnected.
    fn deliver(&self, mut result: VanityResult) -> bool {
        loop {
            match self.result_tx.send_timeout(result, SEND_RETRY) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(pending)) => {
                    if self.stop_flag.load(Ordering::Relaxed) {
                        return false;
                    }
                    result = pending;
                }
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::PatternType;
    use crate::mnemonic::EntropyInfo;
    use crossbeam_channel::unbounded;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEST_JUNK: &str = "test test test test test test test test test test test junk";

    fn make_worker(
        pattern: &str,
        max_attempts: u64,
    ) -> (SearchWorker, crossbeam_channel::Receiver<VanityResult>, Arc<WorkerStats>) {
        let settings = SearchSettings {
            threads: 1,
            entropy: EntropyInfo::new(128).unwrap(),
            path: DerivationPath::ethereum(),
            passphrase: String::new(),
            max_attempts,
        };
        let (tx, rx) = unbounded();
        let stats = Arc::new(WorkerStats::new());
        let worker = SearchWorker::new(
            3,
            &settings,
            Arc::new(settings.path.clone()),
            Pattern::new(pattern, PatternType::Prefix).unwrap(),
            tx,
            Arc::new(AtomicBool::new(false)),
            stats.clone(),
        );
        (worker, rx, stats)
    }

    #[test]
    fn test_known_mnemonic_matches() {
        let (worker, _rx, _stats) = make_worker("f39fd6", 0);
        let mnemonic = Mnemonic::from_phrase(TEST_JUNK).unwrap();
        let result = worker.try_mnemonic(&mnemonic).unwrap();
        assert_eq!(
            result.address.to_hex(),
            "f39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(result.mnemonic, TEST_JUNK);
        assert_eq!(result.worker_id, 3);
        assert_eq!(
            result.private_key,
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        );
    }

    #[test]
    fn test_known_mnemonic_misses() {
        let (worker, _rx, _stats) = make_worker("1b0000", 0);
        let mnemonic = Mnemonic::from_phrase(TEST_JUNK).unwrap();
        assert!(worker.try_mnemonic(&mnemonic).is_none());
    }

    #[test]
    fn test_run_stops_after_budget() {
        let (worker, rx, stats) = make_worker("", 4);
        worker.run_with_rng(&mut StdRng::seed_from_u64(11));

        assert_eq!(stats.total_attempts(), 4);
        assert_eq!(stats.total_matches(), 4);
        assert_eq!(stats.started_workers(), 1);
        drop(worker);

        let results: Vec<_> = rx.iter().collect();
        assert_eq!(results.len(), 4);
        for result in results {
            let mnemonic = Mnemonic::from_phrase(&result.mnemonic).unwrap();
            assert_eq!(mnemonic.indices().len(), 12);
        }
    }

    #[test]
    fn test_run_respects_stop_flag() {
        let (worker, rx, stats) = make_worker("", 0);
        worker.stop_flag.store(true, Ordering::Relaxed);
        worker.run_with_rng(&mut StdRng::seed_from_u64(5));
        assert_eq!(stats.total_attempts(), 0);
        drop(worker);
        assert!(rx.iter().next().is_none());
    }

    #[test]
    fn test_invalid_keys_are_skipped() {
        let (worker, rx, stats) = make_worker("", 5);
        worker.run_loop(&mut StdRng::seed_from_u64(7), |_| {
            Err(DerivationError::InvalidPrivateKey { index: Some(0) })
        });

        assert_eq!(stats.total_attempts(), 5);
        assert_eq!(stats.total_invalid_keys(), 5);
        assert_eq!(stats.total_matches(), 0);
        drop(worker);
        assert!(rx.iter().next().is_none());
    }

    #[test]
    fn test_search_continues_after_invalid_key() {
        let (worker, rx, stats) = make_worker("", 6);
        let mut calls = 0;
        worker.run_loop(&mut StdRng::seed_from_u64(9), |mnemonic| {
            calls += 1;
            if calls % 2 == 1 {
                Err(DerivationError::InvalidPrivateKey { index: None })
            } else {
                worker.derive_leaf(mnemonic)
            }
        });

        assert_eq!(stats.total_attempts(), 6);
        assert_eq!(stats.total_invalid_keys(), 3);
        assert_eq!(stats.total_matches(), 3);
        drop(worker);
        assert_eq!(rx.iter().count(), 3);
    }

    #[test]
    fn test_claim_attempt_budget() {
        let stats = WorkerStats::new();
        assert!(stats.claim_attempt(2));
        assert!(stats.claim_attempt(2));
        assert!(!stats.claim_attempt(2));
        assert_eq!(stats.total_attempts(), 2);
        assert!(stats.claim_attempt(0));
    }
}
