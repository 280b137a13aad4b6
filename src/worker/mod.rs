//! Worker pool for the parallel mnemonic search.
//!
//! This module provides:
//! - Multi-threaded CPU workers, one independent search loop per thread
//! - A shared stop flag and attempt budget for cancellation
//! - Progress tracking and a single result channel as the reporting sink

mod cpu;
mod pool;

pub use cpu::{SearchWorker, WorkerStats};
pub use pool::{SearchSettings, VanityResult, WorkerPool};
