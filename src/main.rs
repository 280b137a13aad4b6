//! Mnemonic Vanity Address Search CLI
//!
//! Usage:
//!   mnemonic_vanity 0 128                    # auto threads, 12 words, prefix 1b0000
//!   mnemonic_vanity 8 256 "m/44'/60'/0'/0/1" -p dead
//!   mnemonic_vanity 4 128 -p beef -t suffix -n 3

use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use mnemonic_vanity::{Config, ConfigError, Pattern, SearchSettings, WorkerPool};

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();

    let (settings, pattern) = match resolve(&config) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    if config.threads_auto() {
        println!("Threads: {}", settings.threads);
    }
    println!("Derivation Path: {}", settings.path.serialized_hex());

    info!(
        pattern = pattern.pattern(),
        suffix = pattern.suffix().unwrap_or(""),
        kind = %pattern.pattern_type(),
        difficulty = %pattern.difficulty_description(),
        "searching"
    );
    info!(
        path = %settings.path,
        leaf_hardened = settings.path.terminal().is_hardened(),
        words = settings.entropy.word_count(),
        passphrase = !settings.passphrase.is_empty(),
        "derivation"
    );

    let pool = WorkerPool::new(settings, pattern);

    ctrlc_handler(pool.stop_flag_clone());

    let report_interval = Duration::from_secs(config.report_interval);
    let mut found = 0;

    loop {
        match pool.wait_for_result(report_interval) {
            Ok(result) => {
                found += 1;
                debug!(
                    worker = result.worker_id,
                    address = %result.address,
                    private_key = %result.private_key,
                    "match found"
                );

                let mut stdout = io::stdout().lock();
                let written = writeln!(stdout, "{}", result.report_line())
                    .and_then(|_| stdout.flush());
                if let Err(e) = written {
                    warn!(error = %e, "stdout closed, stopping");
                    break;
                }

                if config.count > 0 && found >= config.count {
                    info!(found, "target reached");
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => print_progress(&pool),
            Err(RecvTimeoutError::Disconnected) => {
                info!("all workers finished");
                break;
            }
        }

        if pool.is_stopped() {
            info!("stopped by user");
            break;
        }
    }

    info!(
        attempts = pool.total_attempts(),
        matches = pool.total_matches(),
        invalid_keys = pool.total_invalid_keys(),
        elapsed = %format!("{:.2}s", pool.elapsed().as_secs_f64()),
        rate = %format!("{}/s", format_number(pool.attempts_per_second() as u64)),
        "final statistics"
    );

    pool.join();
}

/// Validates the configuration and resolves what the pool needs.
fn resolve(config: &Config) -> Result<(SearchSettings, Pattern), ConfigError> {
    config.validate()?;
    Ok((config.search_settings()?, config.build_pattern()?))
}

fn print_progress(pool: &WorkerPool) {
    info!(
        elapsed = pool.elapsed().as_secs(),
        attempts = %format_number(pool.total_attempts()),
        rate = %format!("{}/s", format_number(pool.attempts_per_second() as u64)),
        invalid_keys = pool.total_invalid_keys(),
        "progress"
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");
}
