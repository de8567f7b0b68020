// src/services/details.rs

//! Course detail fetching.
//!
//! Each discovered course becomes one task in a shared pool. A semaphore caps
//! how many detail requests are in flight at once; everything after the
//! response (extraction and storage) runs outside the permit.

use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::{CrawlContext, CrawlStats};
use crate::services::CourseExtractor;
use crate::storage::CourseSink;
use crate::utils::detail_url;
use crate::utils::http::HttpClient;

/// Pool of detail page fetches feeding the course sink.
pub struct DetailFetcher {
    worker: Arc<DetailWorker>,
    tasks: Mutex<JoinSet<()>>,
}

/// State shared by every detail task.
struct DetailWorker {
    client: Arc<dyn HttpClient>,
    course_base: String,
    extractor: Arc<CourseExtractor>,
    sink: CourseSink,
    permits: Arc<Semaphore>,
    stats: Arc<CrawlStats>,
}

impl DetailFetcher {
    pub fn new(
        client: Arc<dyn HttpClient>,
        course_base: impl Into<String>,
        extractor: Arc<CourseExtractor>,
        sink: CourseSink,
        max_concurrent: usize,
        stats: Arc<CrawlStats>,
    ) -> Self {
        let worker = DetailWorker {
            client,
            course_base: course_base.into(),
            extractor,
            sink,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            stats,
        };
        Self {
            worker: Arc::new(worker),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Queue a detail fetch for one course. Must be called inside a Tokio runtime.
    pub fn fetch(&self, path: &str, code: &str, name: &str) {
        let url = detail_url(&self.worker.course_base, path);
        let ctx = CrawlContext::new(code, name);
        let worker = Arc::clone(&self.worker);

        log::debug!("Queued {} -> {}", ctx.code, url);
        self.lock_tasks().spawn(async move { worker.visit(url, ctx).await });
    }

    /// Wait until every queued and in-flight fetch has finished, including
    /// fetches queued while waiting.
    pub async fn wait(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *self.lock_tasks());
            if tasks.is_empty() {
                break;
            }
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    log::error!("Detail task failed: {}", e);
                }
            }
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DetailWorker {
    async fn visit(&self, url: String, ctx: CrawlContext) {
        let response = {
            let Ok(_permit) = self.permits.acquire().await else {
                return;
            };
            self.client.get(&url).await
        };

        let html = match response {
            Ok(response) if response.is_success() => response.body,
            Ok(response) => {
                CrawlStats::incr(&self.stats.detail_failures);
                log::warn!(
                    "Failed to fetch {} ({}): HTTP {}",
                    ctx.code,
                    url,
                    response.status
                );
                return;
            }
            Err(e) => {
                CrawlStats::incr(&self.stats.detail_failures);
                log::warn!("Failed to fetch {} ({}): {}", ctx.code, url, e);
                return;
            }
        };

        let course = match self.extractor.extract_html(&html, &ctx) {
            Ok(course) => course,
            Err(e) => {
                CrawlStats::incr(&self.stats.extraction_failures);
                log::warn!("{} ({})", e, url);
                return;
            }
        };

        match self.sink.store(&course).await {
            Ok(()) => {
                CrawlStats::incr(&self.stats.stored);
                log::debug!(
                    "Stored {} with {} activities",
                    course.code,
                    course.activities.len()
                );
            }
            Err(e) => {
                CrawlStats::incr(&self.stats.storage_failures);
                log::warn!("Failed to store {}: {}", course.code, e);
            }
        }
    }
}
