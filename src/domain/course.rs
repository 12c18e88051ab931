use std::fmt;

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::domain::CourseCode;

/// A course offered by the program.
///
/// Courses are loaded once from the catalog and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course code.
    pub code: CourseCode,
    /// Human-readable course title.
    pub title: String,
    /// Credit count awarded on completion.
    pub credits: u32,
    /// Identifier of the category this course is listed under.
    pub category: String,
    /// Optional finer grouping inside the category.
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Prerequisite requirements. All of them must hold for the course to be
    /// eligible.
    #[serde(default)]
    pub prerequisites: Vec<Requirement>,
    /// Mutual-exclusion group this course belongs to, if any.
    #[serde(default)]
    pub exclusive_group: Option<String>,
    /// Advisor notes shown alongside the course.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Free-text additional information.
    #[serde(default)]
    pub info: Option<String>,
}

impl Course {
    /// Iterate over every course code referenced by this course's
    /// prerequisites, in declaration order.
    pub fn referenced_codes(&self) -> impl Iterator<Item = &CourseCode> {
        self.prerequisites
            .iter()
            .flat_map(|requirement| requirement.courses.iter())
    }

    /// Summary of all prerequisite requirements on a single line.
    ///
    /// Reads "None" when the course has no prerequisites.
    #[must_use]
    pub fn prerequisite_summary(&self) -> String {
        if self.prerequisites.is_empty() {
            return "None".to_string();
        }

        self.prerequisites
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// How the courses of a [`Requirement`] combine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementKind {
    /// Every referenced course must be completed.
    All,
    /// At least one referenced course must be completed.
    Any,
    /// An unrecognised kind tag. Such a requirement never holds.
    Other(String),
}

impl From<String> for RequirementKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "all" => Self::All,
            "any" => Self::Any,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Any => write!(f, "any"),
            Self::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// A single prerequisite clause of a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRequirement")]
pub struct Requirement {
    /// How the referenced courses combine.
    pub kind: RequirementKind,
    /// The referenced course codes.
    pub courses: NonEmpty<CourseCode>,
    /// Optional explanation shown after the requirement label.
    pub detail: Option<String>,
}

impl Requirement {
    /// Construct an 'all of' requirement.
    #[must_use]
    pub const fn all(courses: NonEmpty<CourseCode>) -> Self {
        Self {
            kind: RequirementKind::All,
            courses,
            detail: None,
        }
    }

    /// Construct an 'any of' requirement.
    #[must_use]
    pub const fn any(courses: NonEmpty<CourseCode>) -> Self {
        Self {
            kind: RequirementKind::Any,
            courses,
            detail: None,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .courses
            .iter()
            .map(CourseCode::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        match &self.kind {
            RequirementKind::All => write!(f, "All of: {names}"),
            RequirementKind::Any => {
                write!(f, "Any of: {names}")?;
                if let Some(detail) = &self.detail {
                    write!(f, " ({detail})")?;
                }
                Ok(())
            }
            RequirementKind::Other(_) => write!(f, "{names}"),
        }
    }
}

#[derive(Deserialize)]
struct RawRequirement {
    #[serde(rename = "type")]
    kind: String,
    courses: Vec<CourseCode>,
    #[serde(default)]
    detail: Option<String>,
}

/// Error returned when a requirement lists no courses.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{0}' requirement must reference at least one course")]
pub struct EmptyRequirementError(String);

impl TryFrom<RawRequirement> for Requirement {
    type Error = EmptyRequirementError;

    fn try_from(raw: RawRequirement) -> Result<Self, Self::Error> {
        let courses = NonEmpty::from_vec(raw.courses)
            .ok_or_else(|| EmptyRequirementError(raw.kind.clone()))?;

        Ok(Self {
            kind: RequirementKind::from(raw.kind),
            courses,
            detail: raw.detail,
        })
    }
}
