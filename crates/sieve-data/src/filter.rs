//! Admission filter applied to every record before aggregation.

use std::path::Path;

use sieve_core::models::LogRecord;
use sieve_core::settings::FilterConfig;
use tracing::{info, warn};

// ── IpPrefixBlocklist ─────────────────────────────────────────────────────────

/// Client IP prefixes whose requests are dropped.
#[derive(Debug, Clone, Default)]
pub struct IpPrefixBlocklist {
    prefixes: Vec<String>,
}

impl IpPrefixBlocklist {
    /// Parse a newline-delimited prefix list. Lines are trimmed; blank lines
    /// and `#` comments are ignored.
    pub fn parse(content: &str) -> Self {
        let mut prefixes: Vec<String> = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !prefixes.iter().any(|p| p == line) {
                prefixes.push(line.to_string());
            }
        }
        Self { prefixes }
    }

    /// Load the prefix list from `path`.
    ///
    /// A file that cannot be read yields an empty blocklist and a warning.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let blocklist = Self::parse(&content);
                info!(
                    "Loaded {} blocked IP prefixes from {}",
                    blocklist.len(),
                    path.display()
                );
                blocklist
            }
            Err(e) => {
                warn!(
                    "Failed to load IP prefix block file {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// `true` when `ip` starts with any blocked prefix.
    pub fn matches(&self, ip: &str) -> bool {
        self.prefixes.iter().any(|prefix| ip.starts_with(prefix.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

// ── RecordFilter ──────────────────────────────────────────────────────────────

/// Decides whether a record is dropped before it reaches the aggregator.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    keep_only_2xx_3xx: bool,
    blocklist: IpPrefixBlocklist,
    excluded_path_suffix: Option<String>,
}

impl RecordFilter {
    pub fn new(
        keep_only_2xx_3xx: bool,
        blocklist: IpPrefixBlocklist,
        excluded_path_suffix: Option<String>,
    ) -> Self {
        Self {
            keep_only_2xx_3xx,
            blocklist,
            excluded_path_suffix,
        }
    }

    /// Build a filter from configuration, loading the blocklist file if one
    /// is configured.
    pub fn from_config(config: &FilterConfig) -> Self {
        let blocklist = config
            .blocklist_path
            .as_deref()
            .map(IpPrefixBlocklist::load)
            .unwrap_or_default();

        Self::new(
            config.keep_only_2xx_3xx,
            blocklist,
            config.excluded_path_suffix.clone(),
        )
    }

    /// Returns `true` when `record` must be dropped.
    ///
    /// A record is blocked when any of the following holds:
    /// * only 2xx/3xx are kept and its status is in another class;
    /// * its client IP starts with a blocked prefix;
    /// * its request path ends with the excluded suffix.
    pub fn is_blocked(&self, record: &LogRecord) -> bool {
        let status_class = record.sc_status / 100;
        let wrong_status_class = self.keep_only_2xx_3xx && !matches!(status_class, 2 | 3);

        let blocked_ip = record
            .c_ip
            .as_deref()
            .is_some_and(|ip| self.blocklist.matches(ip));

        let excluded_path = self
            .excluded_path_suffix
            .as_deref()
            .is_some_and(|suffix| record.cs_uri_stem.ends_with(suffix));

        wrong_status_class || blocked_ip || excluded_path
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(status: u16, ip: Option<&str>, path: &str) -> LogRecord {
        let r = LogRecord::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            status,
            path,
        );
        match ip {
            Some(ip) => r.with_client_ip(ip),
            None => r,
        }
    }

    fn blocklist(content: &str) -> IpPrefixBlocklist {
        IpPrefixBlocklist::parse(content)
    }

    // ── IpPrefixBlocklist ─────────────────────────────────────────────────────

    #[test]
    fn test_blocklist_parse_skips_comments_and_blanks() {
        let list = blocklist("# scanners\n\n  66.249.  \n#10.\n192.168.1.\n\n");
        assert_eq!(list.len(), 2);
        assert!(list.matches("66.249.70.1"));
        assert!(list.matches("192.168.1.20"));
        assert!(!list.matches("10.0.0.1"));
    }

    #[test]
    fn test_blocklist_parse_handles_crlf() {
        let list = blocklist("1.2.3.\r\n4.5.6.\r\n");
        assert!(list.matches("1.2.3.4"));
        assert!(list.matches("4.5.6.7"));
    }

    #[test]
    fn test_blocklist_parse_deduplicates() {
        let list = blocklist("1.2.\n1.2.\n");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_blocklist_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blocked-ip-prefixes.txt");
        std::fs::write(&path, "# bots\n203.0.113.\n").unwrap();

        let list = IpPrefixBlocklist::load(&path);
        assert_eq!(list.len(), 1);
        assert!(list.matches("203.0.113.9"));
    }

    #[test]
    fn test_blocklist_load_missing_file_is_empty() {
        let list = IpPrefixBlocklist::load(&PathBuf::from("/tmp/does-not-exist-sieve-xyz.txt"));
        assert!(list.is_empty());
        assert!(!list.matches("1.2.3.4"));
    }

    // ── RecordFilter ──────────────────────────────────────────────────────────

    #[test]
    fn test_default_filter_blocks_nothing() {
        let filter = RecordFilter::default();
        assert!(!filter.is_blocked(&record(500, Some("1.2.3.4"), "/index.php")));
    }

    #[test]
    fn test_status_policy_keeps_2xx_and_3xx() {
        let filter = RecordFilter::new(true, IpPrefixBlocklist::default(), None);
        assert!(!filter.is_blocked(&record(200, None, "/")));
        assert!(!filter.is_blocked(&record(206, None, "/")));
        assert!(!filter.is_blocked(&record(301, None, "/")));
        assert!(!filter.is_blocked(&record(304, None, "/")));
    }

    #[test]
    fn test_status_policy_blocks_other_classes() {
        let filter = RecordFilter::new(true, IpPrefixBlocklist::default(), None);
        assert!(filter.is_blocked(&record(101, None, "/")));
        assert!(filter.is_blocked(&record(404, None, "/")));
        assert!(filter.is_blocked(&record(503, None, "/")));
        assert!(filter.is_blocked(&record(0, None, "/")));
    }

    #[test]
    fn test_404_blocked_regardless_of_ip_and_path() {
        let filter = RecordFilter::new(true, blocklist("9.9.9."), Some(".php".to_string()));
        assert!(filter.is_blocked(&record(404, Some("10.0.0.1"), "/")));
        assert!(filter.is_blocked(&record(404, None, "/about")));
    }

    #[test]
    fn test_blocked_ip_blocked_even_with_success_status() {
        let filter = RecordFilter::new(true, blocklist("10.0.0."), None);
        assert!(filter.is_blocked(&record(200, Some("10.0.0.1"), "/")));
        assert!(!filter.is_blocked(&record(200, Some("10.0.1.1"), "/")));
    }

    #[test]
    fn test_blocklist_ignored_without_client_ip() {
        let filter = RecordFilter::new(false, blocklist("1"), None);
        assert!(!filter.is_blocked(&record(200, None, "/")));
    }

    #[test]
    fn test_excluded_suffix() {
        let filter = RecordFilter::new(false, IpPrefixBlocklist::default(), Some(".php".to_string()));
        assert!(filter.is_blocked(&record(200, None, "/wp-login.php")));
        assert!(!filter.is_blocked(&record(200, None, "/php/index.html")));
    }

    #[test]
    fn test_status_policy_off_keeps_errors() {
        let filter = RecordFilter::new(false, IpPrefixBlocklist::default(), None);
        assert!(!filter.is_blocked(&record(404, None, "/")));
    }

    #[test]
    fn test_from_config_loads_blocklist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blocked.txt");
        std::fs::write(&path, "172.16.\n").unwrap();

        let filter = RecordFilter::from_config(&FilterConfig {
            keep_only_2xx_3xx: true,
            blocklist_path: Some(path),
            excluded_path_suffix: None,
        });
        assert!(filter.is_blocked(&record(200, Some("172.16.0.4"), "/")));
        assert!(filter.is_blocked(&record(403, Some("8.8.8.8"), "/")));
        assert!(!filter.is_blocked(&record(200, Some("8.8.8.8"), "/")));
    }

    #[test]
    fn test_from_config_unreadable_blocklist_degrades() {
        let filter = RecordFilter::from_config(&FilterConfig {
            keep_only_2xx_3xx: false,
            blocklist_path: Some(PathBuf::from("/tmp/does-not-exist-sieve-abc.txt")),
            excluded_path_suffix: None,
        });
        assert!(!filter.is_blocked(&record(200, Some("10.0.0.1"), "/")));
    }
}
