//! The saved completion set of a workspace.

use std::{
    collections::BTreeSet,
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::{CourseCode, Engine};

/// Errors that can occur while reading or writing a progress file.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The file could not be read or written.
    #[error("failed to access progress file {}: {source}", path.display())]
    Io {
        /// Path of the progress file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The file content is not valid progress TOML.
    #[error("failed to parse progress file {}: {source}", path.display())]
    Parse {
        /// Path of the progress file.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },
    /// The progress could not be serialized.
    #[error("failed to serialize progress: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A snapshot of the courses a student has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Progress {
    completed: BTreeSet<CourseCode>,

    /// Fingerprint of the catalog the snapshot was taken against.
    catalog_fingerprint: Option<String>,

    /// When the snapshot was taken.
    updated: Option<DateTime<Utc>>,
}

/// Outcome of replaying saved progress into an engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Restore {
    /// Number of courses marked complete.
    pub restored: usize,
    /// Saved codes that are no longer in the catalog.
    pub skipped: Vec<CourseCode>,
    /// Whether the catalog changed since the snapshot was taken.
    pub catalog_changed: bool,
}

impl Progress {
    /// Take a snapshot of the engine's completion set.
    #[must_use]
    pub fn capture(engine: &Engine) -> Self {
        Self {
            completed: engine.completed().cloned().collect(),
            catalog_fingerprint: Some(engine.catalog().fingerprint()),
            updated: Some(Utc::now()),
        }
    }

    /// The saved course codes.
    pub fn completed(&self) -> impl Iterator<Item = &CourseCode> {
        self.completed.iter()
    }

    /// When the snapshot was taken, if recorded.
    #[must_use]
    pub const fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    /// Replay the snapshot into an engine through
    /// [`Engine::toggle_completion`], so exclusivity rules still apply.
    ///
    /// Codes missing from the catalog are skipped and reported.
    #[instrument(level = "debug", skip_all)]
    pub fn restore(&self, engine: &mut Engine) -> Restore {
        let mut restore = Restore {
            catalog_changed: self
                .catalog_fingerprint
                .as_ref()
                .is_some_and(|saved| saved != &engine.catalog().fingerprint()),
            ..Restore::default()
        };

        for code in &self.completed {
            match engine.toggle_completion(code, true) {
                Ok(toggle) => {
                    restore.restored += 1;
                    for evicted in toggle.evicted {
                        tracing::warn!("saved course {evicted} conflicts with {code}; keeping {code}");
                        restore.restored -= 1;
                    }
                }
                Err(error) => {
                    tracing::warn!("skipping saved progress: {error}");
                    restore.skipped.push(code.clone());
                }
            }
        }

        restore
    }

    /// Load a snapshot from a TOML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>, ProgressError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProgressError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ProgressError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Save the snapshot to a TOML file.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ProgressError> {
        let content = toml::to_string_pretty(self)?;

        let io_error = |source| ProgressError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(path, content).map_err(io_error)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        catalog_fingerprint: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        updated: Option<DateTime<Utc>>,

        #[serde(default)]
        completed: BTreeSet<CourseCode>,
    },
}

impl From<Versions> for Progress {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                catalog_fingerprint,
                updated,
                completed,
            } => Self {
                completed,
                catalog_fingerprint,
                updated,
            },
        }
    }
}

impl From<Progress> for Versions {
    fn from(progress: Progress) -> Self {
        Self::V1 {
            catalog_fingerprint: progress.catalog_fingerprint,
            updated: progress.updated,
            completed: progress.completed,
        }
    }
}
