mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use sieve_core::settings::{Command, Settings};
use sieve_core::time_utils;
use sieve_data::analysis::analyze_logs;
use sieve_data::filter::RecordFilter;
use sieve_data::report::write_analytics;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;
    tracing::debug!("Sieve v{} starting", env!("CARGO_PKG_VERSION"));

    match &settings.command {
        Command::Months { count } => {
            let today = chrono::Local::now().date_naive();
            for prefix in time_utils::month_prefixes(today, *count) {
                println!("{}", prefix);
            }
        }

        Command::Compute {
            logs_dir, output, ..
        } => {
            let blocklist = bootstrap::discover_blocklist_path();
            if let Some(path) = &blocklist {
                tracing::debug!("Default blocklist found at {}", path.display());
            }

            let config = settings
                .command
                .filter_config(blocklist)
                .context("compute command without filter configuration")?;
            tracing::info!(
                "Computing analytics from {} (only 2xx/3xx: {}, excluded suffix: {:?})",
                logs_dir.display(),
                config.keep_only_2xx_3xx,
                config.excluded_path_suffix
            );

            let filter = RecordFilter::from_config(&config);
            let result = analyze_logs(logs_dir, filter)
                .with_context(|| format!("Failed to analyse logs in {}", logs_dir.display()))?;

            tracing::info!(
                "Read {} records from {} files in {:.2}s, computed in {:.2}s",
                result.metadata.records_read,
                result.metadata.files_processed,
                result.metadata.load_time_seconds,
                result.metadata.compute_time_seconds
            );

            write_analytics(output, &result.analytics)?;
        }
    }

    Ok(())
}
