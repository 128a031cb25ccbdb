use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time_utils;

/// A single request line read from a CloudFront (v1.0) access log.
///
/// Optional columns are `None` when CloudFront wrote `-` or left them blank.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Calendar date of the request (UTC).
    pub date: NaiveDate,
    /// Time of day of the request (UTC).
    pub time: NaiveTime,
    pub x_edge_location: Option<String>,
    pub sc_bytes: Option<u64>,
    /// Client IP address as logged.
    pub c_ip: Option<String>,
    pub cs_method: String,
    pub cs_host: String,
    /// Request path.
    pub cs_uri_stem: String,
    /// HTTP response status.
    pub sc_status: u16,
    /// Raw `Referer` header value.
    pub cs_referer: Option<String>,
    pub cs_user_agent: Option<String>,
    pub cs_uri_query: Option<String>,
    pub cs_cookie: Option<String>,
    pub x_edge_result_type: Option<String>,
    pub x_edge_request_id: Option<String>,
    pub x_host_header: Option<String>,
    pub cs_protocol: Option<String>,
    pub cs_bytes: Option<u64>,
    pub time_taken: Option<f64>,
    pub x_forwarded_for: Option<String>,
    pub ssl_protocol: Option<String>,
    pub ssl_cipher: Option<String>,
    pub x_edge_response_result_type: Option<String>,
    pub cs_protocol_version: Option<String>,
    pub fle_status: Option<String>,
    pub fle_encrypted_fields: Option<String>,
    pub c_port: Option<u16>,
    pub time_to_first_byte: Option<f64>,
    pub x_edge_detailed_result_type: Option<String>,
    pub sc_content_type: Option<String>,
    pub sc_content_len: Option<u64>,
    pub sc_range_start: Option<String>,
    pub sc_range_end: Option<String>,
}

impl LogRecord {
    /// Build a record with only the mandatory columns set.
    pub fn new(date: NaiveDate, time: NaiveTime, sc_status: u16, cs_uri_stem: &str) -> Self {
        Self {
            date,
            time,
            x_edge_location: None,
            sc_bytes: None,
            c_ip: None,
            cs_method: "GET".to_string(),
            cs_host: String::new(),
            cs_uri_stem: cs_uri_stem.to_string(),
            sc_status,
            cs_referer: None,
            cs_user_agent: None,
            cs_uri_query: None,
            cs_cookie: None,
            x_edge_result_type: None,
            x_edge_request_id: None,
            x_host_header: None,
            cs_protocol: None,
            cs_bytes: None,
            time_taken: None,
            x_forwarded_for: None,
            ssl_protocol: None,
            ssl_cipher: None,
            x_edge_response_result_type: None,
            cs_protocol_version: None,
            fle_status: None,
            fle_encrypted_fields: None,
            c_port: None,
            time_to_first_byte: None,
            x_edge_detailed_result_type: None,
            sc_content_type: None,
            sc_content_len: None,
            sc_range_start: None,
            sc_range_end: None,
        }
    }

    pub fn with_client_ip(mut self, ip: &str) -> Self {
        self.c_ip = Some(ip.to_string());
        self
    }

    pub fn with_referer(mut self, referer: &str) -> Self {
        self.cs_referer = Some(referer.to_string());
        self
    }

    /// Day key, e.g. `"2024-03-01"`.
    pub fn day_key(&self) -> String {
        time_utils::day_key(self.date)
    }

    /// Month key, e.g. `"2024-03"`.
    pub fn month_key(&self) -> String {
        time_utils::month_key(self.date)
    }

    /// Milliseconds since the Unix epoch. The logged time is already UTC.
    pub fn timestamp_ms(&self) -> i64 {
        time_utils::timestamp_ms(self.date, self.time)
    }
}

/// The records read from one log file plus the number of lines that could
/// not be turned into a [`LogRecord`].
#[derive(Debug, Clone)]
pub struct LogSlice {
    pub filename: String,
    pub records: Vec<LogRecord>,
    pub num_skipped: usize,
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Visitors and average time on site for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SieveDailyStats {
    /// `YYYY-MM-DD`
    pub date: String,
    pub visitors: u64,
    pub avg_time_on_site_secs: u64,
}

/// Visitor, referrer and page distributions for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SieveMonthlyStats {
    /// `YYYY-MM`
    pub id: String,
    /// e.g. `January 2022`
    pub name: String,
    pub visitors: u64,
    pub referrals: BTreeMap<String, u64>,
    pub pages: BTreeMap<String, u64>,
}

/// The analytics report produced by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SieveAnalytics {
    pub daily: Vec<SieveDailyStats>,
    pub monthly: Vec<SieveMonthlyStats>,
    /// Epoch milliseconds.
    pub created: i64,
}

impl SieveAnalytics {
    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
