//! Reading catalog JSON files from disk.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::domain::{Catalog, Issue, Severity};

/// Errors that can occur while loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The file is not a well-formed catalog.
    #[error("failed to parse catalog {}: {source}", path.display())]
    Parse {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
    /// The catalog parsed, but failed validation.
    #[error("catalog {} is invalid: {}", path.display(), summarize(issues))]
    Invalid {
        /// Path of the catalog file.
        path: PathBuf,
        /// The error-severity issues that were found.
        issues: Vec<Issue>,
    },
}

fn summarize(issues: &[Issue]) -> String {
    const MAX_DISPLAY: usize = 3;

    let shown = issues
        .iter()
        .take(MAX_DISPLAY)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    if issues.len() > MAX_DISPLAY {
        format!("{shown}... (and {} more)", issues.len() - MAX_DISPLAY)
    } else {
        shown
    }
}

/// Read, parse and validate the catalog at `path`.
///
/// Warnings are always logged. Errors reject the catalog when `strict` is
/// set, and are logged otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if `strict` is
/// set and validation finds error-severity issues.
#[instrument(level = "debug")]
pub fn load_catalog(path: &Path, strict: bool) -> Result<Catalog, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = Catalog::from_json(&json).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let (errors, warnings): (Vec<_>, Vec<_>) = catalog
        .validate()
        .into_iter()
        .partition(|issue| issue.severity() == Severity::Error);

    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    if !errors.is_empty() {
        if strict {
            return Err(LoadError::Invalid {
                path: path.to_path_buf(),
                issues: errors,
            });
        }
        for error in &errors {
            tracing::warn!("{error} (ignored, strict mode is off)");
        }
    }

    tracing::debug!(
        courses = catalog.courses().len(),
        "loaded catalog from {}",
        path.display()
    );
    Ok(catalog)
}
