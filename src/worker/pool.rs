//! Worker pool management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::info;

use crate::crypto::Address;
use crate::hd::DerivationPath;
use crate::matcher::Pattern;
use crate::mnemonic::EntropyInfo;

use super::cpu::{SearchWorker, WorkerStats};

/// Result of a successful vanity search.
#[derive(Debug, Clone)]
pub struct VanityResult {
    /// The matching address
    pub address: Address,
    /// The mnemonic phrase that derives it
    pub mnemonic: String,
    /// The leaf private key (hex encoded, no 0x prefix)
    pub private_key: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl VanityResult {
    /// Formats the result as `0x<address>\t<mnemonic>`.
    pub fn report_line(&self) -> String {
        format!("{}\t{}", self.address.to_hex_prefixed(), self.mnemonic)
    }
}

/// Everything a pool needs besides the pattern.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Number of worker threads
    pub threads: usize,
    /// Entropy size of generated mnemonics
    pub entropy: EntropyInfo,
    /// Derivation path walked for every mnemonic
    pub path: DerivationPath,
    /// BIP-39 passphrase (empty by default)
    pub passphrase: String,
    /// Stop after this many mnemonics across all workers (0 = unlimited)
    pub max_attempts: u64,
}

/// Manages a pool of workers for parallel vanity search.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// The pattern to search for
    pattern: Pattern,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for results
    result_rx: Receiver<VanityResult>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Creates a new worker pool and starts `settings.threads` workers.
    pub fn new(settings: SearchSettings, pattern: Pattern) -> Self {
        let (result_tx, result_rx) = bounded(100);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());

        let handles = Self::spawn_workers(
            &settings,
            pattern.clone(),
            result_tx,
            stop_flag.clone(),
            stats.clone(),
        );

        info!(
            workers = settings.threads,
            path = %settings.path,
            words = settings.entropy.word_count(),
            "worker pool started"
        );

        Self {
            num_workers: settings.threads,
            pattern,
            handles: Some(handles),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        }
    }

    /// Spawns worker threads.
    ///
    /// The sender is moved into the workers, so the channel disconnects
    /// once every worker has exited.
    fn spawn_workers(
        settings: &SearchSettings,
        pattern: Pattern,
        result_tx: Sender<VanityResult>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Vec<JoinHandle<()>> {
        let path = Arc::new(settings.path.clone());

        (0..settings.threads)
            .map(|id| {
                let worker = SearchWorker::new(
                    id,
                    settings,
                    path.clone(),
                    pattern.clone(),
                    result_tx.clone(),
                    stop_flag.clone(),
                    stats.clone(),
                );

                thread::Builder::new()
                    .name(format!("vanity-worker-{}", id))
                    .spawn(move || worker.run())
                    .expect("Failed to spawn worker thread")
            })
            .collect()
    }

    /// Waits for a result with optional timeout.
    ///
    /// Returns `Ok(result)` if a match is found. `Timeout` means the search
    /// is still running; `Disconnected` means every worker has exited and
    /// all results were consumed.
    pub fn wait_for_result(&self, timeout: Duration) -> Result<VanityResult, RecvTimeoutError> {
        self.result_rx.recv_timeout(timeout)
    }

    /// Returns an iterator over results (blocking until all workers exit).
    pub fn results(&self) -> impl Iterator<Item = VanityResult> + '_ {
        self.result_rx.iter()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops and waits for all workers to complete.
    pub fn join(mut self) {
        self.stop();
        self.join_handles();
    }

    fn join_handles(&mut self) {
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the number of workers that entered their search loop.
    pub fn started_workers(&self) -> usize {
        self.stats.started_workers()
    }

    /// Returns the pattern being searched for.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the total mnemonics tried across all workers.
    pub fn total_attempts(&self) -> u64 {
        self.stats.total_attempts()
    }

    /// Returns the attempts discarded because of an invalid derived key.
    pub fn total_invalid_keys(&self) -> u64 {
        self.stats.total_invalid_keys()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current search rate (mnemonics per second).
    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        // Wait for workers to finish if they haven't been joined
        self.join_handles();
    }
}
