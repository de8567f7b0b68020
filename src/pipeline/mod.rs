//! Pipeline entry points for crawler operations.
//!
//! - `run_update`: Crawl the course list and every course detail page into storage

pub mod update;

pub use update::{CourseCrawler, run_update};
