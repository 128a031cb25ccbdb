//! Writing the analytics report to disk.

use std::path::{Path, PathBuf};

use sieve_core::error::{Result, SieveError};
use sieve_core::models::SieveAnalytics;
use tracing::info;

/// Serialise `analytics` as pretty JSON and write it to `path`.
///
/// Missing parent directories are created. The report is written to a
/// sibling temp file first and then renamed over `path`, so readers never
/// observe a half-written report.
pub fn write_analytics(path: &Path, analytics: &SieveAnalytics) -> Result<()> {
    let json = analytics.to_json()?;
    let write_err = |source: std::io::Error| SieveError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, json.as_bytes()).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    info!(
        "Wrote analytics ({} days, {} months) to {}",
        analytics.daily.len(),
        analytics.monthly.len(),
        path.display()
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "analytics.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
