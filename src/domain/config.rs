use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for an advising workspace.
///
/// This struct holds settings that control where the catalog is loaded from
/// and how strictly it is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Path of the catalog JSON file.
    ///
    /// Relative paths are resolved against the workspace root.
    catalog: PathBuf,

    /// Whether catalog errors (unknown prerequisite references, cycles,
    /// duplicate codes) prevent the catalog from loading.
    ///
    /// When `false`, errors are logged and the catalog is used as-is; a
    /// requirement naming an unknown course then behaves as unmet.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            strict: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The configured catalog path, as written in the config file.
    #[must_use]
    pub fn catalog(&self) -> &Path {
        &self.catalog
    }

    /// Sets the catalog path.
    pub fn set_catalog(&mut self, path: PathBuf) {
        self.catalog = path;
    }

    /// Resolves the catalog path against the workspace root.
    #[must_use]
    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        if self.catalog.is_absolute() {
            self.catalog.clone()
        } else {
            root.join(&self.catalog)
        }
    }
}

fn default_catalog() -> PathBuf {
    PathBuf::from("program_data.json")
}

const fn default_strict() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_catalog")]
        catalog: PathBuf,

        #[serde(default = "default_strict")]
        strict: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { catalog, strict } => Self { catalog, strict },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            catalog: config.catalog,
            strict: config.strict,
        }
    }
}
