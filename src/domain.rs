//! Domain models for course advising.
//!
//! This module contains the catalog types, the validated course code, the
//! workspace configuration, and the eligibility engine that evaluates
//! prerequisite and exclusivity rules.

/// The static course catalog and its validation.
pub mod catalog;
pub use catalog::{Catalog, Category, ExclusiveGroup, Issue, Program, Severity};

mod code;
pub use code::{CourseCode, InvalidCodeError};

mod config;
pub use config::Config;

/// Course and prerequisite requirement types.
pub mod course;
pub use course::{Course, Requirement, RequirementKind};

/// The eligibility engine.
pub mod engine;
pub use engine::{Change, CourseStatus, Engine, Summary, Toggle, UnknownCourse};

#[cfg(test)]
pub(crate) mod fixtures;
