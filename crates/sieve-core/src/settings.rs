use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::time_utils::MAX_PREVIOUS_MONTHS;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Traffic analytics from CloudFront access logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sieve",
    about = "Traffic analytics from CloudFront access logs",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Command,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the YEAR-MONTH- prefixes for this month and the previous <COUNT> months
    Months {
        /// How many previous months to include (at most 1200)
        #[arg(
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(..=MAX_PREVIOUS_MONTHS)
        )]
        count: i64,
    },

    /// Compute analytics from a directory of logs and write them as JSON
    Compute {
        /// Directory holding the CloudFront log files
        logs_dir: PathBuf,

        /// Where to write the JSON report
        output: PathBuf,

        /// Newline-delimited file of blocked client IP prefixes
        #[arg(long)]
        blocklist: Option<PathBuf>,

        /// Keep every response status instead of only 2xx and 3xx
        #[arg(long)]
        keep_all_statuses: bool,

        /// Drop requests whose path ends with this suffix (e.g. ".php")
        #[arg(long)]
        exclude_suffix: Option<String>,
    },
}

// ── FilterConfig ───────────────────────────────────────────────────────────────

/// Static configuration for the record filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Drop every record whose status is not 2xx or 3xx.
    pub keep_only_2xx_3xx: bool,
    /// Newline-delimited list of blocked client IP prefixes.
    pub blocklist_path: Option<PathBuf>,
    /// Drop records whose request path ends with this suffix.
    pub excluded_path_suffix: Option<String>,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Effective log level: `--debug` overrides `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

impl Command {
    /// Build the filter configuration for a `compute` command.
    ///
    /// `fallback_blocklist` is used when `--blocklist` was not given. Returns
    /// `None` for commands that do not filter records.
    pub fn filter_config(&self, fallback_blocklist: Option<PathBuf>) -> Option<FilterConfig> {
        match self {
            Command::Compute {
                blocklist,
                keep_all_statuses,
                exclude_suffix,
                ..
            } => Some(FilterConfig {
                keep_only_2xx_3xx: !keep_all_statuses,
                blocklist_path: blocklist.clone().or(fallback_blocklist),
                excluded_path_suffix: exclude_suffix.clone().filter(|s| !s.is_empty()),
            }),
            Command::Months { .. } => None,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
