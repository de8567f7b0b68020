// src/services/listing.rs

//! Course list fetching.
//!
//! The course finder returns every matching course in one JSON batch. Each
//! row carries an HTML anchor (`<a href=PATH>CODE</a>`) and the course name;
//! every row becomes one detail fetch.
//!
//! A non-200 answer means the server has not handed us a session yet. The
//! rejected body is dropped unread and the same URL is visited again, which
//! picks up the session cookie from the rejected response.

use std::sync::Arc;

use scraper::{Html, Selector};
use serde::Deserialize;
use tokio::task::JoinSet;

use crate::error::{AppError, Result};
use crate::models::CrawlStats;
use crate::services::DetailFetcher;
use crate::utils::http::HttpClient;

/// One course discovered on the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseLink {
    pub path: String,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct CourseListPayload {
    #[serde(rename = "aaData")]
    aa_data: Vec<Vec<serde_json::Value>>,
}

/// What a single visit of the list endpoint produced.
#[derive(Debug)]
enum ListVisit {
    /// 200 with a body to dispatch from
    Accepted(String),
    /// Any other status; needs a session before trying again
    Rejected(u16),
    /// Transport failure, nothing to do
    Dropped,
}

/// Fetches the course list and feeds the detail pool.
pub struct ListFetcher {
    client: Arc<dyn HttpClient>,
    list_url: String,
    details: Arc<DetailFetcher>,
    max_session_retries: Option<u32>,
    stats: Arc<CrawlStats>,
}

impl ListFetcher {
    pub fn new(
        client: Arc<dyn HttpClient>,
        list_url: impl Into<String>,
        details: Arc<DetailFetcher>,
        max_session_retries: Option<u32>,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            client,
            list_url: list_url.into(),
            details,
            max_session_retries,
            stats,
        }
    }

    /// Crawl the list and block until every detail fetch it queued is done.
    ///
    /// Only a malformed list payload is an error; it aborts before any
    /// detail fetch is queued.
    pub async fn run(&self) -> Result<()> {
        let mut visits = JoinSet::new();
        let mut recoveries: u32 = 0;
        self.spawn_visit(&mut visits);

        while let Some(joined) = visits.join_next().await {
            let visit = match joined {
                Ok(visit) => visit,
                Err(e) => {
                    log::error!("List task failed: {}", e);
                    continue;
                }
            };

            match visit {
                ListVisit::Accepted(body) => {
                    recoveries = 0;
                    let links = parse_course_list(&body)?;
                    log::info!("Found {} courses", links.len());
                    self.dispatch(&links);
                }
                ListVisit::Rejected(status) => {
                    if self.max_session_retries.is_some_and(|max| recoveries >= max) {
                        log::error!(
                            "Course list still rejected (HTTP {}) after {} session recoveries, giving up",
                            status,
                            recoveries
                        );
                        continue;
                    }
                    recoveries += 1;
                    CrawlStats::incr(&self.stats.session_recoveries);
                    log::info!("Course list rejected (HTTP {}), refreshing session", status);
                    self.spawn_visit(&mut visits);
                }
                ListVisit::Dropped => {}
            }
        }

        self.details.wait().await;
        Ok(())
    }

    fn spawn_visit(&self, visits: &mut JoinSet<ListVisit>) {
        let client = Arc::clone(&self.client);
        let url = self.list_url.clone();
        CrawlStats::incr(&self.stats.list_visits);

        visits.spawn(async move {
            match client.get(&url).await {
                Ok(response) if response.status == 200 => ListVisit::Accepted(response.body),
                Ok(response) => ListVisit::Rejected(response.status),
                Err(e) => {
                    log::warn!("Failed to fetch course list {}: {}", url, e);
                    ListVisit::Dropped
                }
            }
        });
    }

    fn dispatch(&self, links: &[CourseLink]) {
        for link in links {
            CrawlStats::incr(&self.stats.discovered);
            self.details.fetch(&link.path, &link.code, &link.name);
        }
    }
}

/// Parse the course list payload into detail links.
///
/// Any row without an anchor cell at index 1 and a name cell at index 2
/// fails the whole batch. A row whose anchor has no `href` or no code text is
/// skipped.
pub fn parse_course_list(body: &str) -> Result<Vec<CourseLink>> {
    let payload: CourseListPayload = serde_json::from_str(body)?;
    let anchor_sel =
        Selector::parse("a[href]").map_err(|e| AppError::selector("a[href]", format!("{e:?}")))?;

    let mut links = Vec::with_capacity(payload.aa_data.len());
    for (i, row) in payload.aa_data.iter().enumerate() {
        let anchor = row
            .get(1)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::list_parse(format!("row {i}: no anchor cell")))?;
        let name = row
            .get(2)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::list_parse(format!("row {i}: no name cell")))?;

        match parse_anchor(anchor, &anchor_sel) {
            Some((path, code)) => links.push(CourseLink {
                path,
                code,
                name: name.trim().to_string(),
            }),
            None => log::warn!("Skipping row {}: no course link in {:?}", i, anchor),
        }
    }
    Ok(links)
}

/// `(href, link text)` of the first anchor in a row fragment.
fn parse_anchor(fragment: &str, anchor_sel: &Selector) -> Option<(String, String)> {
    let html = Html::parse_fragment(fragment);
    let anchor = html.select(anchor_sel).next()?;
    let href = anchor.value().attr("href")?.trim().to_string();
    let code = anchor.text().collect::<String>().trim().to_string();

    if href.is_empty() || code.is_empty() {
        return None;
    }
    Some((href, code))
}
