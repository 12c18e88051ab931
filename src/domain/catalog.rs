//! The static program catalog.
//!
//! A [`Catalog`] is loaded once and never mutated. It owns the courses,
//! categories and exclusive groups, keeps lookup maps over them, and keeps a
//! prerequisite graph used for validation and for "unlocks" queries.

use std::collections::BTreeMap;

use borsh::BorshSerialize;
use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap, Direction};
use serde::{Deserialize, Deserializer};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::domain::{Course, CourseCode, RequirementKind};

/// Program-level information shown in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    /// Program name.
    pub name: String,
    /// Short program description.
    #[serde(default)]
    pub description: String,
    /// Catalog year, e.g. `2024-2025`.
    #[serde(default, deserialize_with = "text_or_number")]
    pub catalog_year: String,
    /// Credits required to complete the program.
    #[serde(default)]
    pub total_credits: u32,
}

/// A category courses are listed under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Identifier referenced by [`Course::category`].
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
}

/// A set of mutually exclusive course choices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExclusiveGroup {
    /// Identifier referenced by [`Course::exclusive_group`].
    pub id: String,
    /// Display title.
    pub title: String,
    /// Explanation of the rule.
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogData {
    program: Program,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    exclusive_groups: Vec<ExclusiveGroup>,
    courses: Vec<Course>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}

/// How serious a catalog [`Issue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The catalog still works, but some courses display or behave in a
    /// degraded way.
    Warning,
    /// The catalog is inconsistent; eligibility results cannot be trusted.
    Error,
}

/// A problem found while validating a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Issue {
    /// More than one course uses the same code. The last one wins.
    #[error("course code {0} is defined more than once")]
    DuplicateCode(CourseCode),
    /// A prerequisite references a course that is not in the catalog.
    #[error("{course} requires unknown course {missing}")]
    UnknownPrerequisite {
        /// The course declaring the requirement.
        course: CourseCode,
        /// The code that could not be resolved.
        missing: CourseCode,
    },
    /// A set of courses that (transitively) require each other.
    #[error("prerequisite cycle: {}", join_codes(.0))]
    PrerequisiteCycle(Vec<CourseCode>),
    /// A course names a category that is not defined.
    #[error("{course} is listed under unknown category '{category}'")]
    UnknownCategory {
        /// The offending course.
        course: CourseCode,
        /// The unresolved category id.
        category: String,
    },
    /// A course names an exclusive group that is not defined.
    #[error("{course} belongs to undeclared exclusive group '{group}'")]
    UnknownExclusiveGroup {
        /// The offending course.
        course: CourseCode,
        /// The unresolved group id.
        group: String,
    },
    /// A requirement uses a kind other than `all` or `any`.
    #[error("{course} has a requirement of unknown kind '{kind}' that can never be met")]
    UnknownRequirementKind {
        /// The offending course.
        course: CourseCode,
        /// The unrecognised kind tag.
        kind: String,
    },
}

fn join_codes(codes: &[CourseCode]) -> String {
    codes
        .iter()
        .map(CourseCode::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl Issue {
    /// The severity of this issue.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::DuplicateCode(_)
            | Self::UnknownPrerequisite { .. }
            | Self::PrerequisiteCycle(_) => Severity::Error,
            Self::UnknownCategory { .. }
            | Self::UnknownExclusiveGroup { .. }
            | Self::UnknownRequirementKind { .. } => Severity::Warning,
        }
    }
}

/// The complete, immutable course catalog of a program.
#[derive(Debug, Clone)]
pub struct Catalog {
    program: Program,
    categories: Vec<Category>,
    exclusive_groups: Vec<ExclusiveGroup>,
    courses: Vec<Course>,

    /// Lookup from course code to index in `courses`.
    by_code: BTreeMap<CourseCode, usize>,
    category_index: BTreeMap<String, usize>,
    group_index: BTreeMap<String, usize>,

    /// Courses declaring membership of each exclusive group, including groups
    /// that are not declared in `exclusive_groups`.
    group_members: BTreeMap<String, Vec<usize>>,

    duplicates: Vec<CourseCode>,

    /// Prerequisite graph over course indices. Edges point from a course to
    /// each course its requirements reference.
    graph: DiGraphMap<usize, ()>,
}

impl Catalog {
    /// Build a catalog from its parts.
    ///
    /// This never fails; inconsistencies are reported by
    /// [`Catalog::validate`]. Earlier definitions of a duplicated code are
    /// discarded.
    #[must_use]
    pub fn new(
        program: Program,
        categories: Vec<Category>,
        exclusive_groups: Vec<ExclusiveGroup>,
        courses: Vec<Course>,
    ) -> Self {
        let mut last_definition = BTreeMap::new();
        let mut duplicates = Vec::new();
        for (index, course) in courses.iter().enumerate() {
            if last_definition.insert(course.code.clone(), index).is_some() {
                duplicates.push(course.code.clone());
            }
        }

        // Only the last definition of a duplicated code is kept.
        let courses: Vec<Course> = courses
            .into_iter()
            .enumerate()
            .filter(|(index, course)| last_definition.get(&course.code) == Some(index))
            .map(|(_, course)| course)
            .collect();
        if !duplicates.is_empty() {
            tracing::debug!(?duplicates, "dropped shadowed course definitions");
        }

        let mut by_code = BTreeMap::new();
        let mut group_members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, course) in courses.iter().enumerate() {
            by_code.insert(course.code.clone(), index);
            if let Some(group) = &course.exclusive_group {
                group_members.entry(group.clone()).or_default().push(index);
            }
        }

        let category_index = categories
            .iter()
            .enumerate()
            .map(|(index, category)| (category.id.clone(), index))
            .collect();
        let group_index = exclusive_groups
            .iter()
            .enumerate()
            .map(|(index, group)| (group.id.clone(), index))
            .collect();

        let mut graph = DiGraphMap::with_capacity(courses.len(), courses.len() * 2);
        for (index, course) in courses.iter().enumerate() {
            graph.add_node(index);
            for code in course.referenced_codes() {
                if let Some(&target) = by_code.get(code) {
                    graph.add_edge(index, target, ());
                }
            }
        }

        Self {
            program,
            categories,
            exclusive_groups,
            courses,
            by_code,
            category_index,
            group_index,
            group_members,
            duplicates,
            graph,
        }
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or does not match the
    /// catalog structure.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: CatalogData = serde_json::from_str(json)?;
        Ok(Self::new(
            data.program,
            data.categories,
            data.exclusive_groups,
            data.courses,
        ))
    }

    /// Program-level information.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// All courses, in catalog order.
    ///
    /// When a code is defined more than once only its last definition is
    /// listed.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Categories, in catalog order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Declared exclusive groups, in catalog order.
    #[must_use]
    pub fn exclusive_groups(&self) -> &[ExclusiveGroup] {
        &self.exclusive_groups
    }

    /// Find a course by its code.
    #[must_use]
    pub fn course(&self, code: &str) -> Option<&Course> {
        self.by_code.get(code).map(|&index| &self.courses[index])
    }

    /// Find a course by user-supplied code.
    ///
    /// An exact match wins. Otherwise the code is matched ignoring ASCII case,
    /// provided exactly one course matches that way.
    #[must_use]
    pub fn resolve(&self, code: &str) -> Option<&Course> {
        if let Some(course) = self.course(code) {
            return Some(course);
        }

        let mut matches = self
            .courses
            .iter()
            .filter(|course| course.code.eq_ignore_ascii_case(code));
        match (matches.next(), matches.next()) {
            (Some(course), None) => Some(course),
            _ => None,
        }
    }

    /// Find a category by its id.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index
            .get(id)
            .map(|&index| &self.categories[index])
    }

    /// Find a declared exclusive group by its id.
    #[must_use]
    pub fn exclusive_group(&self, id: &str) -> Option<&ExclusiveGroup> {
        self.group_index
            .get(id)
            .map(|&index| &self.exclusive_groups[index])
    }

    /// Courses that declare membership of the given exclusive group.
    pub fn group_members(&self, group: &str) -> impl Iterator<Item = &Course> {
        self.group_members
            .get(group)
            .into_iter()
            .flatten()
            .map(|&index| &self.courses[index])
    }

    /// Courses grouped by category.
    ///
    /// Categories keep their catalog order and courses are sorted by code.
    /// Categories with no courses are omitted, and courses whose category is
    /// unknown are dropped.
    #[must_use]
    pub fn grouped_by_category(&self) -> Vec<(&Category, Vec<&Course>)> {
        let mut groups: Vec<(&Category, Vec<&Course>)> = self
            .categories
            .iter()
            .map(|category| (category, Vec::new()))
            .collect();

        for course in &self.courses {
            if let Some(&index) = self.category_index.get(&course.category) {
                groups[index].1.push(course);
            }
        }

        groups.retain(|(_, courses)| !courses.is_empty());
        for (_, courses) in &mut groups {
            courses.sort_by(|a, b| a.code.cmp(&b.code));
        }
        groups
    }

    /// Courses whose prerequisites reference the given course, sorted by
    /// code.
    #[must_use]
    pub fn unlocks(&self, code: &str) -> Vec<&Course> {
        let Some(&index) = self.by_code.get(code) else {
            return Vec::new();
        };

        let mut courses: Vec<_> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .map(|source| &self.courses[source])
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        courses
    }

    /// Courses whose code or title contains the query, ignoring case.
    ///
    /// A blank query matches every course.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Course> + 'a {
        let needle = query.trim().to_lowercase();
        self.courses.iter().filter(move |course| {
            needle.is_empty()
                || format!("{} {}", course.code, course.title)
                    .to_lowercase()
                    .contains(&needle)
        })
    }

    /// Display label for a course's category, e.g. `Core • Systems`.
    ///
    /// Falls back to the raw category id when the category is unknown.
    #[must_use]
    pub fn category_label(&self, course: &Course) -> String {
        let Some(category) = self.category(&course.category) else {
            return course.category.clone();
        };

        match &course.subcategory {
            Some(subcategory) => format!("{} • {subcategory}", category.name),
            None => category.name.clone(),
        }
    }

    /// Check the catalog for inconsistencies.
    ///
    /// Issues are returned errors first, then warnings, each in catalog
    /// order.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self
            .duplicates
            .iter()
            .cloned()
            .map(Issue::DuplicateCode)
            .collect();

        for course in &self.courses {
            for missing in course
                .referenced_codes()
                .filter(|code| !self.by_code.contains_key(code.as_str()))
            {
                issues.push(Issue::UnknownPrerequisite {
                    course: course.code.clone(),
                    missing: missing.clone(),
                });
            }
        }

        issues.extend(self.cycles().into_iter().map(Issue::PrerequisiteCycle));

        for course in &self.courses {
            if !self.category_index.contains_key(&course.category) {
                issues.push(Issue::UnknownCategory {
                    course: course.code.clone(),
                    category: course.category.clone(),
                });
            }

            if let Some(group) = &course.exclusive_group {
                if !self.group_index.contains_key(group) {
                    issues.push(Issue::UnknownExclusiveGroup {
                        course: course.code.clone(),
                        group: group.clone(),
                    });
                }
            }

            for requirement in &course.prerequisites {
                if let RequirementKind::Other(kind) = &requirement.kind {
                    issues.push(Issue::UnknownRequirementKind {
                        course: course.code.clone(),
                        kind: kind.clone(),
                    });
                }
            }
        }

        issues.sort_by_key(|issue| std::cmp::Reverse(issue.severity()));
        issues
    }

    /// Return all prerequisite cycles as sorted lists of course codes.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<CourseCode>> {
        let mut cycles = Vec::new();

        for component in tarjan_scc(&self.graph) {
            if component.len() > 1 {
                let mut codes: Vec<_> = component
                    .iter()
                    .map(|&index| self.courses[index].code.clone())
                    .collect();
                codes.sort();
                cycles.push(codes);
                continue;
            }

            let Some(&node) = component.first() else {
                continue;
            };

            if self.graph.contains_edge(node, node) {
                cycles.push(vec![self.courses[node].code.clone()]);
            }
        }

        cycles.sort();
        cycles
    }

    /// A stable hash of everything in the catalog that affects eligibility.
    ///
    /// Titles, descriptions and notes do not contribute, so cosmetic edits to
    /// the catalog do not invalidate saved progress.
    ///
    /// # Panics
    ///
    /// Panics if borsh serialization fails (which should never happen for this
    /// data structure).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        #[derive(BorshSerialize)]
        struct CourseData {
            code: String,
            credits: u32,
            exclusive_group: Option<String>,
            prerequisites: Vec<(String, Vec<String>)>,
        }

        let mut courses: Vec<CourseData> = self
            .courses
            .iter()
            .map(|course| CourseData {
                code: course.code.to_string(),
                credits: course.credits,
                exclusive_group: course.exclusive_group.clone(),
                prerequisites: course
                    .prerequisites
                    .iter()
                    .map(|requirement| {
                        (
                            requirement.kind.to_string(),
                            requirement.courses.iter().map(ToString::to_string).collect(),
                        )
                    })
                    .collect(),
            })
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));

        let encoded = borsh::to_vec(&courses).expect("this should never fail");
        let hash = Sha256::digest(encoded);
        format!("{hash:x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures;

    #[test]
    fn parses_sample_catalog() {
        let catalog = fixtures::catalog();

        assert_eq!(catalog.program().name, "Computer Science BS");
        assert_eq!(catalog.program().catalog_year, "2024-2025");
        assert_eq!(catalog.program().total_credits, 120);
        assert_eq!(catalog.courses().len(), 7);
        assert_eq!(catalog.course("CS201").unwrap().title, "Data Structures");
        assert!(catalog.course("CS999").is_none());
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn numeric_catalog_year_is_kept_as_text() {
        let catalog = Catalog::from_json(
            r#"{"program": {"name": "P", "catalogYear": 2025}, "categories": [], "courses": []}"#,
        )
        .unwrap();
        assert_eq!(catalog.program().catalog_year, "2025");
        assert!(catalog.exclusive_groups().is_empty());
    }

    #[test]
    fn groups_courses_by_category_in_catalog_order() {
        let catalog = fixtures::catalog();
        let grouped = catalog.grouped_by_category();

        let names: Vec<_> = grouped.iter().map(|(c, _)| c.id.as_str()).collect();
        assert_eq!(names, ["core", "math"]);

        let core: Vec<_> = grouped[0].1.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(core, ["CS101", "CS201", "CS301", "CS350"]);
    }

    #[test]
    fn unlocks_lists_dependent_courses() {
        let catalog = fixtures::catalog();

        let unlocked: Vec<_> = catalog
            .unlocks("CS201")
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(unlocked, ["CS301", "CS350"]);
        assert!(catalog.unlocks("CS350").is_empty());
        assert!(catalog.unlocks("NOPE").is_empty());
    }

    #[test]
    fn search_matches_code_and_title_case_insensitively() {
        let catalog = fixtures::catalog();

        let hits: Vec<_> = catalog.search("calc").map(|c| c.code.as_str()).collect();
        assert_eq!(hits, ["MATH201", "MATH205"]);

        let hits: Vec<_> = catalog.search("cs3").map(|c| c.code.as_str()).collect();
        assert_eq!(hits, ["CS301", "CS350"]);

        assert_eq!(catalog.search("   ").count(), catalog.courses().len());
    }

    #[test]
    fn category_label_includes_subcategory() {
        let catalog = fixtures::catalog();

        let course = catalog.course("CS301").unwrap();
        assert_eq!(catalog.category_label(course), "Core Computer Science • Systems");

        let course = catalog.course("CS101").unwrap();
        assert_eq!(catalog.category_label(course), "Core Computer Science");
    }

    #[test]
    fn group_members_include_all_declaring_courses() {
        let catalog = fixtures::catalog();
        let members: Vec<_> = catalog
            .group_members("calculus")
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(members, ["MATH201", "MATH205"]);
        assert_eq!(catalog.group_members("missing").count(), 0);
    }

    #[test]
    fn validate_reports_broken_catalog() {
        let catalog = Catalog::from_json(
            r#"{
                "program": {"name": "Broken"},
                "categories": [{"id": "core", "name": "Core"}],
                "courses": [
                    {"code": "A", "title": "A", "credits": 3, "category": "core",
                     "prerequisites": [{"type": "all", "courses": ["B"]}]},
                    {"code": "B", "title": "B", "credits": 3, "category": "core",
                     "prerequisites": [{"type": "all", "courses": ["A"]}]},
                    {"code": "C", "title": "C", "credits": 3, "category": "elsewhere",
                     "exclusiveGroup": "ghost",
                     "prerequisites": [{"type": "all", "courses": ["Z9"]},
                                       {"type": "either", "courses": ["A"]}]},
                    {"code": "D", "title": "D", "credits": 3, "category": "core",
                     "prerequisites": [{"type": "any", "courses": ["D"]}]},
                    {"code": "E", "title": "E", "credits": 3, "category": "core"},
                    {"code": "E", "title": "E again", "credits": 3, "category": "core"}
                ]
            }"#,
        )
        .unwrap();

        let issues = catalog.validate();
        let code = |s: &str| CourseCode::try_from(s).unwrap();

        assert_eq!(
            issues,
            vec![
                Issue::DuplicateCode(code("E")),
                Issue::UnknownPrerequisite {
                    course: code("C"),
                    missing: code("Z9"),
                },
                Issue::PrerequisiteCycle(vec![code("A"), code("B")]),
                Issue::PrerequisiteCycle(vec![code("D")]),
                Issue::UnknownCategory {
                    course: code("C"),
                    category: "elsewhere".to_string(),
                },
                Issue::UnknownExclusiveGroup {
                    course: code("C"),
                    group: "ghost".to_string(),
                },
                Issue::UnknownRequirementKind {
                    course: code("C"),
                    kind: "either".to_string(),
                },
            ]
        );
        assert_eq!(issues[0].severity(), Severity::Error);
        assert_eq!(issues[6].severity(), Severity::Warning);
        assert_eq!(issues[2].to_string(), "prerequisite cycle: A -> B");
    }

    #[test]
    fn duplicate_codes_keep_only_the_last_definition() {
        let catalog = Catalog::from_json(
            r#"{
                "program": {"name": "Dupes"},
                "categories": [{"id": "core", "name": "Core"}],
                "exclusiveGroups": [
                    {"id": "first", "title": "First"},
                    {"id": "second", "title": "Second"}
                ],
                "courses": [
                    {"code": "A", "title": "Old A", "credits": 3, "category": "core",
                     "exclusiveGroup": "first"},
                    {"code": "B", "title": "B", "credits": 3, "category": "core"},
                    {"code": "A", "title": "New A", "credits": 3, "category": "core",
                     "exclusiveGroup": "second",
                     "prerequisites": [{"type": "all", "courses": ["B"]}]}
                ]
            }"#,
        )
        .unwrap();

        let codes: Vec<_> = catalog.courses().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(codes, ["B", "New A"]);
        assert_eq!(catalog.course("A").unwrap().title, "New A");
        assert_eq!(catalog.group_members("first").count(), 0);
        assert_eq!(catalog.group_members("second").count(), 1);
        assert_eq!(catalog.unlocks("B").len(), 1);
        assert_eq!(
            catalog.validate(),
            vec![Issue::DuplicateCode(CourseCode::try_from("A").unwrap())]
        );
    }

    #[test]
    fn resolve_prefers_exact_then_unique_case_insensitive_match() {
        let catalog = Catalog::from_json(
            r#"{
                "program": {"name": "Mixed"},
                "categories": [{"id": "core", "name": "Core"}],
                "courses": [
                    {"code": "eng_1a", "title": "Writing", "credits": 3, "category": "core"},
                    {"code": "Cs101", "title": "Intro", "credits": 3, "category": "core"},
                    {"code": "cs101", "title": "Intro (old)", "credits": 3, "category": "core"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.resolve("ENG_1A").unwrap().code.as_str(), "eng_1a");
        assert_eq!(catalog.resolve("eng_1a").unwrap().code.as_str(), "eng_1a");
        assert_eq!(catalog.resolve("cs101").unwrap().code.as_str(), "cs101");
        assert!(catalog.resolve("CS101").is_none(), "ambiguous without exact match");
        assert!(catalog.resolve("MATH1").is_none());
    }

    #[test]
    fn fingerprint_ignores_cosmetic_changes() {
        let original = fixtures::catalog();
        let edited = Catalog::from_json(
            &fixtures::CATALOG_JSON.replace("Data Structures", "Data Structures II"),
        )
        .unwrap();
        assert_eq!(original.fingerprint(), edited.fingerprint());

        let changed = Catalog::from_json(&fixtures::CATALOG_JSON.replace(
            r#""code": "CS350", "title": "Algorithms", "credits": 3"#,
            r#""code": "CS350", "title": "Algorithms", "credits": 4"#,
        ))
        .unwrap();
        assert_ne!(original.fingerprint(), changed.fingerprint());
    }
}
