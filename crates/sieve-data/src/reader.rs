//! CloudFront access-log discovery and loading.
//!
//! Reads the (usually gzip-compressed) standard log files CloudFront writes
//! to S3 and converts each request line into a [`LogRecord`].

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use sieve_core::error::{Result, SieveError};
use sieve_core::models::{LogRecord, LogSlice};
use sieve_core::time_utils;
use tracing::{debug, error};

/// First line of every CloudFront standard log file in the supported format.
pub const CF_LOGS_VERSION_ONE_HEADER: &str = "#Version: 1.0";

/// Columns up to and including `sc-status`; shorter lines are rejected.
const MIN_COLUMNS: usize = 9;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ── Public API ────────────────────────────────────────────────────────────────

/// List the log files directly inside `logs_dir`, sorted by name.
///
/// Subdirectories and dotfiles are ignored.
pub fn find_log_files(logs_dir: &Path) -> Result<Vec<PathBuf>> {
    if !logs_dir.is_dir() {
        return Err(SieveError::LogsDirNotFound(logs_dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(logs_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file() && !entry.file_name().to_string_lossy().starts_with('.')
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Read one log file into a [`LogSlice`].
///
/// Files whose first line is not [`CF_LOGS_VERSION_ONE_HEADER`] yield no
/// records; every request line in them counts as skipped.
pub fn read_log_file(path: &Path) -> Result<LogSlice> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let content = read_log_text(path)?;
    let mut lines = content.lines().peekable();
    let has_header =
        lines.peek().map(|first| first.trim_end()) == Some(CF_LOGS_VERSION_ONE_HEADER);

    let request_lines: Vec<&str> = lines
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .collect();

    if !has_header {
        error!("File ({}) has missing or unknown header, skipping", filename);
        return Ok(LogSlice {
            filename,
            records: Vec::new(),
            num_skipped: request_lines.len(),
        });
    }

    let records: Vec<LogRecord> = request_lines
        .iter()
        .filter_map(|line| parse_cloudfront_line(line))
        .collect();
    let num_skipped = request_lines.len() - records.len();

    debug!(
        "File {}: {} lines, {} records, {} skipped",
        filename,
        request_lines.len(),
        records.len(),
        num_skipped
    );

    Ok(LogSlice {
        filename,
        records,
        num_skipped,
    })
}

/// Parse one tab-separated CloudFront v1.0 request line.
///
/// Returns `None` when the line is too short or the date, time or status
/// column is invalid.
pub fn parse_cloudfront_line(line: &str) -> Option<LogRecord> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < MIN_COLUMNS {
        return None;
    }

    let text = |i: usize| clean(parts.get(i).copied());
    let number = |i: usize| text(i).and_then(|v| v.parse::<u64>().ok());
    let decimal = |i: usize| text(i).and_then(|v| v.parse::<f64>().ok());

    Some(LogRecord {
        date: time_utils::parse_date(parts[0].trim())?,
        time: time_utils::parse_time_of_day(parts[1].trim())?,
        x_edge_location: text(2),
        sc_bytes: number(3),
        c_ip: text(4),
        cs_method: parts[5].trim().to_string(),
        cs_host: parts[6].trim().to_string(),
        cs_uri_stem: parts[7].trim().to_string(),
        sc_status: parts[8].trim().parse().ok()?,
        cs_referer: text(9),
        cs_user_agent: text(10),
        cs_uri_query: text(11),
        cs_cookie: text(12),
        x_edge_result_type: text(13),
        x_edge_request_id: text(14),
        x_host_header: text(15),
        cs_protocol: text(16),
        cs_bytes: number(17),
        time_taken: decimal(18),
        x_forwarded_for: text(19),
        ssl_protocol: text(20),
        ssl_cipher: text(21),
        x_edge_response_result_type: text(22),
        cs_protocol_version: text(23),
        fle_status: text(24),
        fle_encrypted_fields: text(25),
        c_port: text(26).and_then(|v| v.parse::<u16>().ok()),
        time_to_first_byte: decimal(27),
        x_edge_detailed_result_type: text(28),
        sc_content_type: text(29),
        sc_content_len: number(30),
        sc_range_start: text(31),
        sc_range_end: text(32),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `None` for a missing, blank or `-` column.
fn clean(column: Option<&str>) -> Option<String> {
    let trimmed = column?.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read the whole file into memory, gunzipping it when it carries the gzip
/// magic bytes. Invalid UTF-8 is replaced with U+FFFD so a single bad byte
/// only spoils the line it sits on.
fn read_log_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| SieveError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|source| SieveError::Decompress {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&decoded).into_owned())
    } else {
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
