// src/models/mod.rs

//! Domain models for the course crawler.

mod config;
mod course;
mod stats;

// Re-export all public types
pub use config::{CatalogConfig, Config, CrawlerConfig, StorageBackend, StorageConfig};
pub use course::{Activity, Course, CourseField, CrawlContext};
pub use stats::{CrawlStats, CrawlSummary};
