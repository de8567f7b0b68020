// src/models/stats.rs

//! Counters collected while a crawl pass runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Live counters shared by the list and detail pools.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub list_visits: AtomicUsize,
    pub session_recoveries: AtomicUsize,
    pub discovered: AtomicUsize,
    pub detail_failures: AtomicUsize,
    pub extraction_failures: AtomicUsize,
    pub stored: AtomicUsize,
    pub storage_failures: AtomicUsize,
}

impl CrawlStats {
    pub fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Freeze the counters into a summary.
    pub fn summary(&self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> CrawlSummary {
        CrawlSummary {
            start_time,
            end_time,
            list_visits: self.list_visits.load(Ordering::Relaxed),
            session_recoveries: self.session_recoveries.load(Ordering::Relaxed),
            discovered: self.discovered.load(Ordering::Relaxed),
            detail_failures: self.detail_failures.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }
}

/// Result of one completed crawl pass.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub list_visits: usize,
    pub session_recoveries: usize,
    pub discovered: usize,
    pub detail_failures: usize,
    pub extraction_failures: usize,
    pub stored: usize,
    pub storage_failures: usize,
}

impl CrawlSummary {
    /// Courses discovered but not stored, for any reason.
    pub fn dropped(&self) -> usize {
        self.discovered.saturating_sub(self.stored)
    }
}
