// src/models/course.rs

//! Course and Activity records scraped from the catalog.

use serde::{Deserialize, Serialize};

/// A catalog course, keyed by its unique code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    pub code: String,
    pub name: String,
    pub division: String,
    pub description: String,
    pub department: String,
    pub prerequisites: String,
    pub corequisites: String,
    pub exclusions: String,
    pub recommended_preparation: String,
    pub level: String,
    #[serde(rename = "UTSCBreadth")]
    pub utsc_breadth: String,
    #[serde(rename = "UTMDistribution")]
    pub utm_distribution: String,
    pub arts_science_breadth: String,
    pub arts_science_distribution: String,
    #[serde(rename = "APSCElectives")]
    pub apsc_electives: String,
    pub campus: String,
    pub term: String,

    /// Scheduled sections, in the order the schedule table lists them
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Course {
    /// Mutable access to a text attribute by schema field.
    pub fn field_mut(&mut self, field: CourseField) -> &mut String {
        match field {
            CourseField::Code => &mut self.code,
            CourseField::Name => &mut self.name,
            CourseField::Division => &mut self.division,
            CourseField::Description => &mut self.description,
            CourseField::Department => &mut self.department,
            CourseField::Prerequisites => &mut self.prerequisites,
            CourseField::Corequisites => &mut self.corequisites,
            CourseField::Exclusions => &mut self.exclusions,
            CourseField::RecommendedPreparation => &mut self.recommended_preparation,
            CourseField::Level => &mut self.level,
            CourseField::UtscBreadth => &mut self.utsc_breadth,
            CourseField::UtmDistribution => &mut self.utm_distribution,
            CourseField::ArtsScienceBreadth => &mut self.arts_science_breadth,
            CourseField::ArtsScienceDistribution => &mut self.arts_science_distribution,
            CourseField::ApscElectives => &mut self.apsc_electives,
            CourseField::Campus => &mut self.campus,
            CourseField::Term => &mut self.term,
        }
    }
}

/// One scheduled meeting or section of a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Activity {
    pub name: String,
    pub day_time: String,
    pub instructor: String,
    pub location: String,
    pub class_size: u32,
    pub current_enrolment: u32,
    pub waitlist: bool,
    pub delivery: String,
}

/// Text attributes of a [`Course`], in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseField {
    Code,
    Name,
    Division,
    Description,
    Department,
    Prerequisites,
    Corequisites,
    Exclusions,
    RecommendedPreparation,
    Level,
    UtscBreadth,
    UtmDistribution,
    ArtsScienceBreadth,
    ArtsScienceDistribution,
    ApscElectives,
    Campus,
    Term,
}

impl CourseField {
    /// Every field, in schema order.
    pub const ALL: [CourseField; 17] = [
        CourseField::Code,
        CourseField::Name,
        CourseField::Division,
        CourseField::Description,
        CourseField::Department,
        CourseField::Prerequisites,
        CourseField::Corequisites,
        CourseField::Exclusions,
        CourseField::RecommendedPreparation,
        CourseField::Level,
        CourseField::UtscBreadth,
        CourseField::UtmDistribution,
        CourseField::ArtsScienceBreadth,
        CourseField::ArtsScienceDistribution,
        CourseField::ApscElectives,
        CourseField::Campus,
        CourseField::Term,
    ];

    /// Attribute name as stored in the serialized record.
    pub fn name(self) -> &'static str {
        match self {
            CourseField::Code => "Code",
            CourseField::Name => "Name",
            CourseField::Division => "Division",
            CourseField::Description => "Description",
            CourseField::Department => "Department",
            CourseField::Prerequisites => "Prerequisites",
            CourseField::Corequisites => "Corequisites",
            CourseField::Exclusions => "Exclusions",
            CourseField::RecommendedPreparation => "RecommendedPreparation",
            CourseField::Level => "Level",
            CourseField::UtscBreadth => "UTSCBreadth",
            CourseField::UtmDistribution => "UTMDistribution",
            CourseField::ArtsScienceBreadth => "ArtsScienceBreadth",
            CourseField::ArtsScienceDistribution => "ArtsScienceDistribution",
            CourseField::ApscElectives => "APSCElectives",
            CourseField::Campus => "Campus",
            CourseField::Term => "Term",
        }
    }

    /// `data-label` of the detail page block holding this field.
    ///
    /// `Code` and `Name` come from the course list, not the detail page.
    pub fn label(self) -> Option<&'static str> {
        match self {
            CourseField::Code | CourseField::Name => None,
            CourseField::Division => Some("Division"),
            CourseField::Description => Some("Course Description"),
            CourseField::Department => Some("Department"),
            CourseField::Prerequisites => Some("Pre-requisites"),
            CourseField::Corequisites => Some("Corequisite"),
            CourseField::Exclusions => Some("Exclusion"),
            CourseField::RecommendedPreparation => Some("Recommended Preparation"),
            CourseField::Level => Some("Course Level"),
            CourseField::UtscBreadth => Some("UTSC Breadth"),
            CourseField::UtmDistribution => Some("UTM Distribution"),
            CourseField::ArtsScienceBreadth => Some("Arts and Science Breadth"),
            CourseField::ArtsScienceDistribution => Some("Arts and Science Distribution"),
            CourseField::ApscElectives => Some("APSC Electives"),
            CourseField::Campus => Some("Campus"),
            CourseField::Term => Some("Term"),
        }
    }
}

/// Identity discovered on the course list, carried to the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlContext {
    pub code: String,
    pub name: String,
}

impl CrawlContext {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}
