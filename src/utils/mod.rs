//! Utility functions and helpers.

pub mod http;

/// Join a detail path from the course list onto the course base URL.
///
/// Paths are appended, not resolved, so a base ending in `/search/` keeps
/// that segment for relative paths.
pub fn detail_url(course_base: &str, path: &str) -> String {
    match (course_base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", course_base, &path[1..]),
        (false, false) => format!("{course_base}/{path}"),
        _ => format!("{course_base}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_url_appends_relative_path() {
        assert_eq!(
            detail_url(
                "https://coursefinder.utoronto.ca/course-search/search/",
                "courseInquiry?methodToCall=start&viewId=CourseDetails-InquiryView&courseId=CSC108H1F20249"
            ),
            "https://coursefinder.utoronto.ca/course-search/search/courseInquiry?methodToCall=start&viewId=CourseDetails-InquiryView&courseId=CSC108H1F20249"
        );
    }

    #[test]
    fn test_detail_url_single_separator() {
        assert_eq!(
            detail_url("https://example.com/base/", "/course/1"),
            "https://example.com/base/course/1"
        );
        assert_eq!(
            detail_url("https://example.com/base", "course/1"),
            "https://example.com/base/course/1"
        );
    }
}
