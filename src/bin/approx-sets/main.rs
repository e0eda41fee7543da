//! Command line front end for `approx-sets`.
//!
//! - `count-ips` extracts IPv4 addresses from a log file, counts distinct ones
//!   exactly and with HyperLogLog, prints a comparison table and saves it as
//!   `comparison_results.txt` and `comparison_results.json`.
//! - `check-passwords` seeds a bloom filter with known passwords and reports
//!   whether each candidate is unique or already used.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use approx_sets::bloom::BloomFilter;
use approx_sets::compare::compare;
use approx_sets::dedup::check_uniqueness;
use approx_sets::estimator::DEFAULT_PRECISION;
use approx_sets::hash::HashFamily;
use approx_sets::observer::TracingObserver;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod ips;
mod report;

/// Approximate membership and distinct counting
#[derive(Parser, Debug)]
#[command(name = "approx-sets")]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare exact and HyperLogLog distinct counts of IP addresses in a log file
    CountIps {
        /// Log file to scan, one record per line
        #[arg(long)]
        log: PathBuf,

        /// HyperLogLog precision in [4..18]
        #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
        precision: u8,

        /// Directory receiving comparison_results.txt and comparison_results.json
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Check candidate passwords for reuse with a bloom filter
    CheckPasswords {
        /// Number of bits in the filter
        #[arg(long, default_value_t = 1000)]
        size: usize,

        /// Number of hash positions per password
        #[arg(long, default_value_t = 3)]
        hashes: u32,

        /// Hash family: wyhash, double or sha256
        #[arg(long, default_value = "wyhash")]
        hash: HashFamily,

        /// Password already in use (repeatable)
        #[arg(long = "known")]
        known: Vec<String>,

        /// Passwords to check, in order
        candidates: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::CountIps {
            log,
            precision,
            output_dir,
        } => count_ips(&log, precision, &output_dir),
        Command::CheckPasswords {
            size,
            hashes,
            hash,
            known,
            candidates,
        } => check_passwords(size, hashes, hash, &known, &candidates),
    }
}

fn count_ips(log: &Path, precision: u8, output_dir: &Path) -> Result<()> {
    tracing::info!(path = %log.display(), "loading log file");
    let ips = ips::load_ips(log)?;
    tracing::info!(rows = ips.len(), "valid IP rows");

    if ips.is_empty() {
        bail!("no valid IP addresses found in {}", log.display());
    }

    let comparison = compare(&ips, precision)?;
    let table = report::table(&comparison);
    println!("\nComparison Results:\n{table}");

    report::save(&comparison, &table, output_dir)?;
    tracing::info!(
        dir = %output_dir.display(),
        "results saved to {} and {}",
        report::TEXT_FILE,
        report::JSON_FILE
    );
    Ok(())
}

fn check_passwords(
    size: usize,
    hashes: u32,
    hash: HashFamily,
    known: &[String],
    candidates: &[String],
) -> Result<()> {
    let mut filter = BloomFilter::with_hasher(size, hashes, hash)?.with_observer(TracingObserver);
    for password in known {
        filter.insert(password.as_str());
    }

    let verdicts = check_uniqueness(&mut filter, candidates.iter().map(String::as_str));
    for (password, verdict) in verdicts {
        println!("Password '{}' - {}.", password.unwrap_or_default(), verdict);
    }
    tracing::debug!(?filter, fpp = filter.estimated_fpp(), "filter state");
    Ok(())
}
