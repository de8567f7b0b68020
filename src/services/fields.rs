// src/services/fields.rs

//! Selector table for the labeled blocks of a course detail page.

use crate::models::CourseField;

/// Selector of the value span inside a `data-label` block.
pub fn field_selector(label: &str) -> String {
    format!("div[data-label='{label}'] span:nth-child(2)")
}

/// Ordered `(field, selector)` pairs for every labeled course field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(CourseField, String)>,
}

impl FieldMapping {
    /// Build the table from the course schema.
    pub fn build() -> Self {
        let entries = CourseField::ALL
            .iter()
            .filter_map(|field| field.label().map(|label| (*field, field_selector(label))))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(CourseField, String)] {
        &self.entries
    }

    pub fn selector(&self, field: CourseField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, s)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
