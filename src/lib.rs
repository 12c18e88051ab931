//! Course Prerequisite Advising
//!
//! A program catalog is a JSON document listing courses, their prerequisite
//! requirements and mutually exclusive course choices. Given the courses a
//! student has completed, the [`Engine`] works out what they can take next.

pub mod domain;
pub use domain::{
    Catalog, Config, Course, CourseCode, CourseStatus, Engine, Issue, Requirement, Severity,
};

/// Loading catalogs and saving progress on disk.
pub mod storage;
pub use storage::{LoadError, Workspace};
