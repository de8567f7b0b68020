//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - The field-to-selector table (`FieldMapping`)
//! - Course page extraction (`CourseExtractor`)
//! - Detail page fetching (`DetailFetcher`)
//! - Course list fetching with session recovery (`ListFetcher`)

mod details;
mod extractor;
mod fields;
mod listing;

pub use details::DetailFetcher;
pub use extractor::CourseExtractor;
pub use fields::{FieldMapping, field_selector};
pub use listing::{CourseLink, ListFetcher, parse_course_list};
