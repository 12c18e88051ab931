//! The eligibility engine.
//!
//! An [`Engine`] owns the catalog together with the two pieces of mutable
//! session state: the set of completed courses and the exclusive-group locks.
//! All mutation goes through [`Engine::toggle_completion`] and
//! [`Engine::reset_all`]; everything else is a pure read.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use tracing::instrument;

use crate::domain::{Catalog, Course, CourseCode, Requirement, RequirementKind};

/// The observable state of a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    /// The course is marked as completed.
    Completed,
    /// Another course in the same exclusive group has been completed.
    Locked,
    /// All prerequisites are met and the course can be taken next.
    Eligible,
    /// At least one prerequisite is not met yet.
    Ineligible,
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Completed => "completed",
            Self::Locked => "locked",
            Self::Eligible => "eligible",
            Self::Ineligible => "ineligible",
        };
        f.pad(label)
    }
}

/// A state change emitted to observers after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A course was marked complete, evicting the listed courses from its
    /// exclusive group.
    Completed {
        /// The course that was marked complete.
        code: CourseCode,
        /// Courses from the same exclusive group that were unmarked.
        evicted: Vec<CourseCode>,
    },
    /// A course was unmarked.
    Uncompleted {
        /// The course that was unmarked.
        code: CourseCode,
    },
    /// All progress was cleared.
    Reset,
}

/// Outcome of [`Engine::toggle_completion`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Toggle {
    /// Whether the completion set or the locks changed.
    pub changed: bool,
    /// Courses that were force-unmarked because they share an exclusive group
    /// with the course that was marked complete.
    pub evicted: Vec<CourseCode>,
}

/// Error returned when an operation names a course that is not in the
/// catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("course {0} is not in the catalog")]
pub struct UnknownCourse(pub String);

/// Aggregate progress figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Number of completed courses.
    pub completed_courses: usize,
    /// Sum of credits over completed courses.
    pub completed_credits: u32,
    /// Number of courses eligible to take next.
    pub eligible_courses: usize,
    /// Credits required by the program.
    pub total_credits: u32,
}

type Observer = Box<dyn FnMut(&Change)>;

/// Evaluates prerequisite and exclusivity rules against a completion set.
pub struct Engine {
    catalog: Catalog,

    /// Codes of courses marked as completed.
    completed: BTreeSet<CourseCode>,

    /// Exclusive group id to the single course currently claiming it.
    ///
    /// A group is present iff one of its members is in `completed`.
    locks: BTreeMap<String, CourseCode>,

    observers: Vec<Observer>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("completed", &self.completed)
            .field("locks", &self.locks)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine over the given catalog with no progress recorded.
    #[must_use]
    pub const fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            completed: BTreeSet::new(),
            locks: BTreeMap::new(),
            observers: Vec::new(),
        }
    }

    /// The catalog this engine evaluates.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Register a callback invoked after every state change.
    ///
    /// Calls that leave the state untouched do not notify.
    pub fn on_change(&mut self, observer: impl FnMut(&Change) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, change: &Change) {
        for observer in &mut self.observers {
            observer(change);
        }
    }

    /// Mark a course as completed or not completed.
    ///
    /// Marking a member of an exclusive group complete claims the group for
    /// that course and unmarks any other completed member. Unmarking releases
    /// the group only if this course holds it.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCourse`] if the code is not in the catalog. The state
    /// is left unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_completion(
        &mut self,
        code: &str,
        completed: bool,
    ) -> Result<Toggle, UnknownCourse> {
        let course = self
            .catalog
            .course(code)
            .ok_or_else(|| UnknownCourse(code.to_string()))?;
        let code = course.code.clone();
        let group = course.exclusive_group.clone();

        let toggle = if completed {
            self.complete(code, group)
        } else {
            self.uncomplete(&code, group.as_deref())
        };

        Ok(toggle)
    }

    fn complete(&mut self, code: CourseCode, group: Option<String>) -> Toggle {
        let mut changed = self.completed.insert(code.clone());
        let mut evicted = Vec::new();

        if let Some(group) = group {
            for member in self.catalog.group_members(&group) {
                if member.code != code && self.completed.remove(&member.code) {
                    evicted.push(member.code.clone());
                }
            }

            if self.locks.get(&group) != Some(&code) {
                tracing::debug!(%group, %code, "claiming exclusive group");
                self.locks.insert(group, code.clone());
                changed = true;
            }
        }

        if changed {
            self.notify(&Change::Completed {
                code,
                evicted: evicted.clone(),
            });
        }

        Toggle { changed, evicted }
    }

    fn uncomplete(&mut self, code: &CourseCode, group: Option<&str>) -> Toggle {
        let mut changed = self.completed.remove(code);

        if let Some(group) = group {
            if self.locks.get(group) == Some(code) {
                tracing::debug!(%group, %code, "releasing exclusive group");
                self.locks.remove(group);
                changed = true;
            }
        }

        if changed {
            self.notify(&Change::Uncompleted { code: code.clone() });
        }

        Toggle {
            changed,
            evicted: Vec::new(),
        }
    }

    /// Clear all completions and exclusive locks.
    pub fn reset_all(&mut self) {
        if self.completed.is_empty() && self.locks.is_empty() {
            return;
        }

        self.completed.clear();
        self.locks.clear();
        self.notify(&Change::Reset);
    }

    /// Whether a single requirement is satisfied by the current completion
    /// set.
    #[must_use]
    pub fn evaluate_requirement(&self, requirement: &Requirement) -> bool {
        match requirement.kind {
            RequirementKind::All => requirement
                .courses
                .iter()
                .all(|code| self.completed.contains(code)),
            RequirementKind::Any => requirement
                .courses
                .iter()
                .any(|code| self.completed.contains(code)),
            RequirementKind::Other(_) => false,
        }
    }

    /// Whether every prerequisite requirement of the course holds.
    #[must_use]
    pub fn prerequisites_satisfied(&self, course: &Course) -> bool {
        course
            .prerequisites
            .iter()
            .all(|requirement| self.evaluate_requirement(requirement))
    }

    /// Whether a different course has claimed this course's exclusive group.
    #[must_use]
    pub fn is_locked_out(&self, course: &Course) -> bool {
        course
            .exclusive_group
            .as_ref()
            .and_then(|group| self.locks.get(group))
            .is_some_and(|holder| holder != &course.code)
    }

    fn is_eligible(&self, course: &Course) -> bool {
        !self.completed.contains(&course.code)
            && !self.is_locked_out(course)
            && self.prerequisites_satisfied(course)
    }

    /// Codes of all courses that can be taken next.
    #[must_use]
    pub fn compute_eligibility(&self) -> BTreeSet<&CourseCode> {
        self.catalog
            .courses()
            .iter()
            .filter(|course| self.is_eligible(course))
            .map(|course| &course.code)
            .collect()
    }

    /// All courses that can be taken next, sorted by code.
    #[must_use]
    pub fn eligible_courses(&self) -> Vec<&Course> {
        self.compute_eligibility()
            .into_iter()
            .filter_map(|code| self.catalog.course(code))
            .collect()
    }

    /// The status of a course, or `None` if the code is unknown.
    #[must_use]
    pub fn status(&self, code: &str) -> Option<CourseStatus> {
        self.catalog
            .course(code)
            .map(|course| self.course_status(course))
    }

    /// The status of a course from the catalog.
    #[must_use]
    pub fn course_status(&self, course: &Course) -> CourseStatus {
        if self.completed.contains(&course.code) {
            CourseStatus::Completed
        } else if self.is_locked_out(course) {
            CourseStatus::Locked
        } else if self.prerequisites_satisfied(course) {
            CourseStatus::Eligible
        } else {
            CourseStatus::Ineligible
        }
    }

    /// Each prerequisite requirement of the course paired with whether it is
    /// currently met.
    pub fn requirement_statuses<'a>(
        &'a self,
        course: &'a Course,
    ) -> impl Iterator<Item = (&'a Requirement, bool)> + 'a {
        course
            .prerequisites
            .iter()
            .map(|requirement| (requirement, self.evaluate_requirement(requirement)))
    }

    /// Whether the course is marked as completed.
    #[must_use]
    pub fn is_completed(&self, code: &str) -> bool {
        self.completed.contains(code)
    }

    /// The course currently claiming an exclusive group, if any.
    #[must_use]
    pub fn lock_for(&self, group: &str) -> Option<&CourseCode> {
        self.locks.get(group)
    }

    /// All exclusive locks, ordered by group id.
    pub fn locks(&self) -> impl Iterator<Item = (&str, &CourseCode)> {
        self.locks.iter().map(|(group, code)| (group.as_str(), code))
    }

    /// All completed course codes, in order.
    pub fn completed(&self) -> impl Iterator<Item = &CourseCode> {
        self.completed.iter()
    }

    /// Progress figures for the summary panel.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let completed_credits = self
            .completed
            .iter()
            .filter_map(|code| self.catalog.course(code))
            .map(|course| course.credits)
            .sum();

        Summary {
            completed_courses: self.completed.len(),
            completed_credits,
            eligible_courses: self.compute_eligibility().len(),
            total_credits: self.catalog.program().total_credits,
        }
    }
}
