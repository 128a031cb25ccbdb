use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name of the IP prefix blocklist looked up when `--blocklist` is not
/// given.
pub const BLOCKLIST_FILE_NAME: &str = "blocked-ip-prefixes.txt";

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`) to an
/// [`EnvFilter`] directive. Unknown names pass through unchanged.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// All output goes to stderr so that stdout stays clean for command output.
/// Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

// ── Blocklist discovery ────────────────────────────────────────────────────────

/// Locate the default IP prefix blocklist.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./resources/blocked-ip-prefixes.txt`
/// 2. `<config dir>/sieve/blocked-ip-prefixes.txt`
pub fn discover_blocklist_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let config_dir = dirs::config_dir();
    discover_blocklist_path_in(&cwd, config_dir.as_deref())
}

fn discover_blocklist_path_in(cwd: &Path, config_dir: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = vec![cwd.join("resources").join(BLOCKLIST_FILE_NAME)];
    if let Some(config_dir) = config_dir {
        candidates.push(config_dir.join("sieve").join(BLOCKLIST_FILE_NAME));
    }
    candidates.into_iter().find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
