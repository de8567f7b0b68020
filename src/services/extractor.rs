// src/services/extractor.rs

//! Course detail page extraction.
//!
//! Turns a rendered course page into a [`Course`]: labeled catalog blocks are
//! read through the [`FieldMapping`] table and the schedule table becomes the
//! ordered activity list.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Activity, Course, CourseField, CrawlContext};
use crate::services::FieldMapping;

/// Region every well-formed detail page renders its catalog data into.
pub const PAGE_ANCHOR: &str = "#correctPage";

/// Rows of the schedule table, looked up inside the anchor region.
pub const SCHEDULE_ROW: &str = "table > tbody > tr";

/// Substring of the status icon that marks an open waitlist.
pub const WAITLIST_MARKER: &str = "checkmark";

/// Number of positional cells in a schedule row.
const ACTIVITY_CELLS: usize = 8;

/// Extracts course records from detail pages with precompiled selectors.
#[derive(Debug)]
pub struct CourseExtractor {
    anchor: Selector,
    fields: Vec<(CourseField, Selector)>,
    schedule_row: Selector,
    icon: Selector,
}

impl CourseExtractor {
    /// Compile every selector of the mapping table.
    pub fn new(mapping: &FieldMapping) -> Result<Self> {
        let fields = mapping
            .entries()
            .iter()
            .map(|(field, selector)| Ok((*field, parse_selector(selector)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            anchor: parse_selector(PAGE_ANCHOR)?,
            fields,
            schedule_row: parse_selector(SCHEDULE_ROW)?,
            icon: parse_selector("img")?,
        })
    }

    /// Parse `html` and extract in one step.
    pub fn extract_html(&self, html: &str, ctx: &CrawlContext) -> Result<Course> {
        let document = Html::parse_document(html);
        self.extract(&document, ctx)
    }

    /// Extract a course from a parsed detail page.
    ///
    /// Fails only when the page has no `#correctPage` region. Missing blocks
    /// leave the matching attributes empty. Only rows of tables inside that
    /// region with exactly eight cells become activities.
    pub fn extract(&self, document: &Html, ctx: &CrawlContext) -> Result<Course> {
        let root = document
            .select(&self.anchor)
            .next()
            .ok_or_else(|| AppError::extraction(&ctx.code, "page has no #correctPage region"))?;

        let mut course = Course::default();
        for (field, selector) in &self.fields {
            if let Some(node) = root.select(selector).next() {
                *course.field_mut(*field) = element_text(node);
            }
        }

        // The course list is the canonical source of identity.
        course.code = ctx.code.clone();
        course.name = ctx.name.clone();

        course.activities = root
            .select(&self.schedule_row)
            .filter_map(|row| self.parse_activity(row))
            .collect();

        Ok(course)
    }

    fn parse_activity(&self, row: ElementRef) -> Option<Activity> {
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        if cells.len() != ACTIVITY_CELLS {
            log::debug!(
                "Skipping table row with {} cells, expected {}",
                cells.len(),
                ACTIVITY_CELLS
            );
            return None;
        }

        let text = |i: usize| element_text(cells[i]);

        Some(Activity {
            name: text(0),
            day_time: text(1),
            instructor: text(2),
            location: text(3),
            class_size: parse_count(&text(4)),
            current_enrolment: parse_count(&text(5)),
            waitlist: self.has_waitlist_icon(cells[6]),
            delivery: text(7),
        })
    }

    fn has_waitlist_icon(&self, cell: ElementRef) -> bool {
        cell.select(&self.icon)
            .next()
            .and_then(|img| img.value().attr("src"))
            .is_some_and(|src| src.contains(WAITLIST_MARKER))
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Integer cell value; anything non-numeric counts as zero.
fn parse_count(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> CourseExtractor {
        CourseExtractor::new(&FieldMapping::build()).unwrap()
    }

    fn ctx() -> CrawlContext {
        CrawlContext::new("CSC108H1", "Introduction to Computer Programming")
    }

    fn block(label: &str, value: &str) -> String {
        format!(r#"<div data-label="{label}"><span>{label}</span><span> {value} </span></div>"#)
    }

    fn row(cells: [&str; 8]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!("<tr>{tds}</tr>")
    }

    fn page(body: &str, rows: &[String]) -> String {
        format!(
            r#"<html><body>
            <h1>Some other title</h1>
            <div id="correctPage">{body}
              <table>
                <thead><tr><th>Activity</th><th>Day and Time</th></tr></thead>
                <tbody>{}</tbody>
              </table>
            </div>
            </body></html>"#,
            rows.concat()
        )
    }

    fn two_row_page() -> String {
        page(
            &[
                block("Division", "Faculty of Arts and Science"),
                block("Course Description", "Programming in a language such as Python."),
                block("Pre-requisites", ""),
                block("Exclusion", "CSC110Y1, CSC148H1"),
                block("Campus", "St. George"),
            ]
            .concat(),
            &[
                row([
                    "LEC0101",
                    "MONDAY 10:00-11:00",
                    "J Smith",
                    "BA 1130",
                    " 500 ",
                    "487",
                    r#"<img src="/images/checkmark.png">"#,
                    "In Person",
                ]),
                row([
                    "LEC0102",
                    "TUESDAY 14:00-15:00",
                    "TBA",
                    "",
                    "n/a",
                    "",
                    r#"<img src="/images/cross.png">"#,
                    "Online",
                ]),
            ],
        )
    }

    #[test]
    fn test_missing_anchor_is_error() {
        let html = r#"<html><body><div id="otherPage">nothing</div></body></html>"#;
        let result = extractor().extract_html(html, &ctx());
        assert!(matches!(result, Err(AppError::Extraction { ref code, .. }) if code == "CSC108H1"));
    }

    #[test]
    fn test_labeled_fields_extracted_and_trimmed() {
        let course = extractor().extract_html(&two_row_page(), &ctx()).unwrap();
        assert_eq!(course.division, "Faculty of Arts and Science");
        assert_eq!(course.description, "Programming in a language such as Python.");
        assert_eq!(course.exclusions, "CSC110Y1, CSC148H1");
        assert_eq!(course.campus, "St. George");
        assert_eq!(course.prerequisites, "");
        assert_eq!(course.term, "");
    }

    #[test]
    fn test_identity_taken_from_context() {
        let course = extractor().extract_html(&two_row_page(), &ctx()).unwrap();
        assert_eq!(course.code, "CSC108H1");
        assert_eq!(course.name, "Introduction to Computer Programming");
    }

    #[test]
    fn test_two_rows_in_document_order() {
        let course = extractor().extract_html(&two_row_page(), &ctx()).unwrap();
        assert_eq!(course.activities.len(), 2);

        let first = &course.activities[0];
        assert_eq!(first.name, "LEC0101");
        assert_eq!(first.day_time, "MONDAY 10:00-11:00");
        assert_eq!(first.instructor, "J Smith");
        assert_eq!(first.location, "BA 1130");
        assert_eq!(first.class_size, 500);
        assert_eq!(first.current_enrolment, 487);
        assert!(first.waitlist);
        assert_eq!(first.delivery, "In Person");

        assert_eq!(course.activities[1].name, "LEC0102");
        assert_eq!(course.activities[1].delivery, "Online");
    }

    #[test]
    fn test_non_numeric_counts_are_zero() {
        let course = extractor().extract_html(&two_row_page(), &ctx()).unwrap();
        let second = &course.activities[1];
        assert_eq!(second.class_size, 0);
        assert_eq!(second.current_enrolment, 0);
    }

    #[test]
    fn test_waitlist_requires_checkmark_icon() {
        let rows = [
            row(["A", "", "", "", "1", "1", r#"<img src="/img/checkmark.gif">"#, ""]),
            row(["B", "", "", "", "1", "1", r#"<img src="/img/blank.gif">"#, ""]),
            row(["C", "", "", "", "1", "1", "", ""]),
            row(["D", "", "", "", "1", "1", "checkmark", ""]),
        ];
        let course = extractor().extract_html(&page("", &rows), &ctx()).unwrap();
        let flags: Vec<bool> = course.activities.iter().map(|a| a.waitlist).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn test_rows_without_eight_cells_are_skipped() {
        let rows = [
            "<tr><td>LEC0101</td><td>FRIDAY</td></tr>".to_string(),
            row(["TUT0101", "MONDAY", "", "", "30", "12", "", "In Person"]),
            "<tr></tr>".to_string(),
        ];
        let course = extractor().extract_html(&page("", &rows), &ctx()).unwrap();
        let names: Vec<&str> = course.activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["TUT0101"]);
    }

    #[test]
    fn test_tables_outside_anchor_are_ignored() {
        let html = page("", &[row(["LEC0101", "MONDAY", "", "", "10", "5", "", "Online"])])
            .replace(
                "<body>",
                r#"<body><table class="layout"><tbody>
                    <tr><td>Navigation</td><td>Home</td></tr>
                    <tr><td>A</td><td>B</td><td>C</td><td>D</td><td>1</td><td>2</td><td></td><td>E</td></tr>
                </tbody></table>"#,
            );
        let course = extractor().extract_html(&html, &ctx()).unwrap();
        let names: Vec<&str> = course.activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["LEC0101"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = two_row_page();
        let document = Html::parse_document(&html);
        let extractor = extractor();

        let first = extractor.extract(&document, &ctx()).unwrap();
        let second = extractor.extract(&document, &ctx()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
