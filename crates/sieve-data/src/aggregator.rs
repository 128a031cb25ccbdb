//! Incremental traffic aggregation over daily and monthly windows.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use sieve_core::models::{LogRecord, SieveAnalytics, SieveDailyStats, SieveMonthlyStats};
use sieve_core::time_utils;
use tracing::debug;
use url::Url;

use crate::filter::RecordFilter;
use crate::sessions::SessionSegmenter;

// ── RefererDomain ─────────────────────────────────────────────────────────────

/// The grouping key derived from a raw `Referer` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefererDomain {
    /// The referrer parsed as a URL; holds its hostname.
    Host(String),
    /// The referrer did not parse as a URL; holds the raw value.
    Raw(String),
}

impl RefererDomain {
    pub fn parse(referer: &str) -> Self {
        match Url::parse(referer) {
            Ok(url) => Self::Host(url.host_str().unwrap_or_default().to_string()),
            Err(_) => Self::Raw(referer.to_string()),
        }
    }

    pub fn into_key(self) -> String {
        match self {
            Self::Host(host) => host,
            Self::Raw(raw) => raw,
        }
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Request timestamps (epoch ms, ascending, unique) per client IP.
type VisitorLog = HashMap<String, Vec<i64>>;

/// Accumulates admitted log records and derives the analytics report.
///
/// Feed every record with [`Aggregator::ingest`] in file order, then call
/// [`Aggregator::compute`] once.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    filter: RecordFilter,
    segmenter: SessionSegmenter,
    /// Day key → client IP → timestamps.
    visitors_by_date: BTreeMap<String, VisitorLog>,
    /// Month key → referrer domain → count.
    referers_by_month: BTreeMap<String, BTreeMap<String, u64>>,
    /// Month key → request path → count.
    pages_by_month: BTreeMap<String, BTreeMap<String, u64>>,
}

impl Aggregator {
    pub fn new(filter: RecordFilter) -> Self {
        Self::with_segmenter(filter, SessionSegmenter::default())
    }

    /// Create an aggregator that splits sessions with `segmenter` instead of
    /// the default 30-minute window.
    pub fn with_segmenter(filter: RecordFilter, segmenter: SessionSegmenter) -> Self {
        Self {
            filter,
            segmenter,
            visitors_by_date: BTreeMap::new(),
            referers_by_month: BTreeMap::new(),
            pages_by_month: BTreeMap::new(),
        }
    }

    /// Admit one record into the running state, or drop it when the filter
    /// blocks it.
    pub fn ingest(&mut self, record: &LogRecord) {
        if self.filter.is_blocked(record) {
            return;
        }

        let date = record.day_key();
        let month = record.month_key();

        if let Some(ip) = record.c_ip.as_deref() {
            let timestamp = record.timestamp_ms();
            let timestamps = self
                .visitors_by_date
                .entry(date)
                .or_default()
                .entry(ip.to_string())
                .or_default();
            // Keep the sequence sorted; an identical timestamp is dropped.
            if let Err(pos) = timestamps.binary_search(&timestamp) {
                timestamps.insert(pos, timestamp);
            }
        }

        if let Some(referer) = record.cs_referer.as_deref() {
            let domain = RefererDomain::parse(referer).into_key();
            *self
                .referers_by_month
                .entry(month.clone())
                .or_default()
                .entry(domain)
                .or_insert(0) += 1;
        }

        *self
            .pages_by_month
            .entry(month)
            .or_default()
            .entry(record.cs_uri_stem.clone())
            .or_insert(0) += 1;
    }

    /// Derive the report from the accumulated state, stamped with the current
    /// time.
    pub fn compute(&self) -> SieveAnalytics {
        self.compute_at(Utc::now().timestamp_millis())
    }

    /// Derive the report with an explicit `created` stamp (epoch ms).
    pub fn compute_at(&self, created: i64) -> SieveAnalytics {
        SieveAnalytics {
            daily: self.daily_stats(),
            monthly: self.monthly_stats(),
            created,
        }
    }

    /// Recorded timestamps for `ip` on `date` (`YYYY-MM-DD`).
    pub fn visitor_timestamps(&self, date: &str, ip: &str) -> Option<&[i64]> {
        self.visitors_by_date
            .get(date)
            .and_then(|visitors| visitors.get(ip))
            .map(Vec::as_slice)
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn daily_stats(&self) -> Vec<SieveDailyStats> {
        self.visitors_by_date
            .iter()
            .map(|(date, visitors)| {
                let sessions: Vec<i64> = visitors
                    .values()
                    .flat_map(|timestamps| self.segmenter.session_durations(timestamps))
                    .collect();
                debug!(
                    "Day {}: {} visitors, {} sessions",
                    date,
                    visitors.len(),
                    sessions.len()
                );

                let avg_time_on_site_secs = if sessions.is_empty() {
                    0
                } else {
                    let total_ms: i64 = sessions.iter().sum();
                    (total_ms / sessions.len() as i64 / 1000) as u64
                };

                SieveDailyStats {
                    date: date.clone(),
                    visitors: visitors.len() as u64,
                    avg_time_on_site_secs,
                }
            })
            .collect()
    }

    fn monthly_stats(&self) -> Vec<SieveMonthlyStats> {
        // Months are enumerated from visitor activity only.
        let mut visitors_by_month: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for (date, visitors) in &self.visitors_by_date {
            visitors_by_month
                .entry(time_utils::month_of_day_key(date))
                .or_default()
                .extend(visitors.keys().map(String::as_str));
        }

        visitors_by_month
            .into_iter()
            .map(|(month, visitors)| SieveMonthlyStats {
                id: month.to_string(),
                name: time_utils::pretty_month(month),
                visitors: visitors.len() as u64,
                referrals: self.referers_by_month.get(month).cloned().unwrap_or_default(),
                pages: self.pages_by_month.get(month).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
