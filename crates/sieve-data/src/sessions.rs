//! Visit segmentation for one visitor's requests on one day.
//!
//! A session opens at the visitor's earliest unassigned request and covers
//! every request made before `start + window`. The window is anchored at the
//! session start; later requests inside it do not extend it.

use chrono::TimeDelta;

/// Default session window: 30 minutes.
pub const DEFAULT_SESSION_WINDOW_MS: i64 = 30 * 60 * 1000;

// ── SessionSegmenter ──────────────────────────────────────────────────────────

/// Splits a visitor's request timestamps into fixed-window sessions.
#[derive(Debug, Clone, Copy)]
pub struct SessionSegmenter {
    /// Width of each session window in milliseconds.
    window_ms: i64,
}

impl Default for SessionSegmenter {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_SESSION_WINDOW_MS,
        }
    }
}

impl SessionSegmenter {
    /// Create a segmenter with the given window width.
    pub fn new(window: TimeDelta) -> Self {
        Self {
            window_ms: window.num_milliseconds(),
        }
    }

    /// The session window as a [`TimeDelta`].
    pub fn window(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.window_ms)
    }

    /// Duration in milliseconds of each session found in `timestamps`.
    ///
    /// `timestamps` must be ascending and free of duplicates (the aggregator
    /// guarantees this). Durations come out in chronological order of their
    /// session start; a single-request session lasts 0 ms.
    pub fn session_durations(&self, timestamps: &[i64]) -> Vec<i64> {
        let mut durations = Vec::new();
        let mut rest = timestamps;

        while let Some(&start) = rest.first() {
            let end = start.saturating_add(self.window_ms);
            // A non-positive window still puts `start` in its own session.
            let in_session = rest.partition_point(|&t| t < end).max(1);
            let last = rest[in_session - 1];
            durations.push(last - start);
            rest = &rest[in_session..];
        }

        durations
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
