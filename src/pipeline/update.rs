// src/pipeline/update.rs

//! Full course catalog refresh.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, CrawlStats, CrawlSummary};
use crate::services::{CourseExtractor, DetailFetcher, FieldMapping, ListFetcher};
use crate::storage::CourseSink;
use crate::utils::http::{self, HttpClient};

/// Everything one crawl pass needs, built once up front.
pub struct CourseCrawler {
    config: Arc<Config>,
    list_client: Arc<dyn HttpClient>,
    detail_client: Arc<dyn HttpClient>,
    extractor: Arc<CourseExtractor>,
    sink: CourseSink,
}

impl CourseCrawler {
    /// Crawler with reqwest clients built from `config.crawler`.
    pub fn new(config: Arc<Config>, sink: CourseSink) -> Result<Self> {
        let list_client = Arc::new(http::create_list_client(&config.crawler)?);
        let detail_client = Arc::new(http::create_detail_client(&config.crawler)?);
        Self::with_clients(config, list_client, detail_client, sink)
    }

    /// Crawler over caller-provided transports.
    pub fn with_clients(
        config: Arc<Config>,
        list_client: Arc<dyn HttpClient>,
        detail_client: Arc<dyn HttpClient>,
        sink: CourseSink,
    ) -> Result<Self> {
        let mapping = FieldMapping::build();
        log::debug!("Field mapping has {} entries", mapping.len());
        let extractor = Arc::new(CourseExtractor::new(&mapping)?);

        Ok(Self {
            config,
            list_client,
            detail_client,
            extractor,
            sink,
        })
    }

    /// Crawl the whole catalog into the sink and return once every list
    /// visit and every detail fetch has finished.
    pub async fn update_data(&self) -> Result<CrawlSummary> {
        let start_time = Utc::now();
        let list_url = self.config.catalog.list_url()?;
        log::info!("Updating course data from {}", list_url);

        let stats = Arc::new(CrawlStats::default());
        let details = Arc::new(DetailFetcher::new(
            Arc::clone(&self.detail_client),
            self.config.catalog.course_base.as_str(),
            Arc::clone(&self.extractor),
            self.sink.clone(),
            self.config.crawler.max_concurrent,
            Arc::clone(&stats),
        ));
        let lister = ListFetcher::new(
            Arc::clone(&self.list_client),
            list_url,
            details,
            self.config.crawler.max_session_retries,
            Arc::clone(&stats),
        );

        lister.run().await?;

        let summary = stats.summary(start_time, Utc::now());
        log_summary(&summary);
        Ok(summary)
    }
}

/// Run one crawl pass with the configured transports.
pub async fn run_update(config: Arc<Config>, sink: CourseSink) -> Result<CrawlSummary> {
    CourseCrawler::new(config, sink)?.update_data().await
}

fn log_summary(summary: &CrawlSummary) {
    let elapsed = summary.end_time - summary.start_time;
    log::info!(
        "Update complete: {} courses discovered, {} stored, {} dropped ({}s)",
        summary.discovered,
        summary.stored,
        summary.dropped(),
        elapsed.num_seconds()
    );
    if summary.dropped() > 0 {
        log::info!(
            "  detail failures: {}, extraction failures: {}, storage failures: {}",
            summary.detail_failures,
            summary.extraction_failures,
            summary.storage_failures
        );
    }
    log::debug!(
        "  list visits: {}, session recoveries: {}",
        summary.list_visits,
        summary.session_recoveries
    );
}
