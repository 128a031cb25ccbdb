//! Main analysis pipeline for Sieve.
//!
//! Discovers the log files in a directory, feeds every record through the
//! [`Aggregator`] and returns the computed analytics together with run
//! metadata.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use sieve_core::error::Result;
use sieve_core::models::SieveAnalytics;
use tracing::{error, info};

use crate::aggregator::Aggregator;
use crate::filter::RecordFilter;
use crate::reader::{find_log_files, read_log_file};

/// Log a progress line every this many files.
const PROGRESS_EVERY_FILES: usize = 1000;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analytics.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of log files read.
    pub files_processed: usize,
    /// Number of request lines parsed into records (before filtering).
    pub records_read: usize,
    /// Number of request lines that could not be parsed.
    pub lines_skipped: usize,
    /// Wall-clock seconds spent reading and ingesting the files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent computing the report.
    pub compute_time_seconds: f64,
}

/// The complete output of [`analyze_logs`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub analytics: SieveAnalytics,
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline over every log file in `logs_dir`.
///
/// 1. List the files with [`find_log_files`].
/// 2. Read each one and ingest its records into an [`Aggregator`].
/// 3. Compute the [`SieveAnalytics`].
///
/// Unparseable lines are counted and reported but never abort the run; a
/// file that cannot be read or decompressed does.
pub fn analyze_logs(logs_dir: &Path, filter: RecordFilter) -> Result<AnalysisResult> {
    let files = find_log_files(logs_dir)?;
    info!("Processing {} log files from {}", files.len(), logs_dir.display());

    // ── Step 1: Load and ingest ───────────────────────────────────────────────
    let load_start = Instant::now();
    let mut aggregator = Aggregator::new(filter);
    let mut records_read = 0usize;
    let mut lines_skipped = 0usize;

    for (index, path) in files.iter().enumerate() {
        if index > 0 && index % PROGRESS_EVERY_FILES == 0 {
            info!("Processed {} of {} files", index, files.len());
        }

        let slice = read_log_file(path)?;
        if slice.num_skipped > 0 {
            error!(
                "File ({}) had {} invalid lines, skipped",
                slice.filename, slice.num_skipped
            );
        }

        records_read += slice.records.len();
        lines_skipped += slice.num_skipped;
        for record in &slice.records {
            aggregator.ingest(record);
        }
    }
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Compute ───────────────────────────────────────────────────────
    let compute_start = Instant::now();
    let analytics = aggregator.compute();
    let compute_time = compute_start.elapsed().as_secs_f64();

    info!(
        "Analysed {} records from {} files ({} lines skipped): {} days, {} months",
        records_read,
        files.len(),
        lines_skipped,
        analytics.daily.len(),
        analytics.monthly.len()
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        files_processed: files.len(),
        records_read,
        lines_skipped,
        load_time_seconds: load_time,
        compute_time_seconds: compute_time,
    };

    Ok(AnalysisResult {
        analytics,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
