//! A directory-backed advising session.
//!
//! A [`Workspace`] ties together the configuration in `.advisor/config.toml`,
//! the catalog file it points to, and the saved progress in
//! `.advisor/progress.toml`. It owns the [`Engine`] for the session.

use std::{
    cell::Cell,
    io,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::instrument;

use crate::{
    domain::{Change, Config, Engine},
    storage::{load_catalog, LoadError, Progress, ProgressError},
};

const STATE_DIR: &str = ".advisor";
const CONFIG_FILE: &str = "config.toml";
const PROGRESS_FILE: &str = "progress.toml";

/// Errors that can occur while opening or initialising a workspace.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// `init` was run on a directory that already has a workspace.
    #[error("Workspace already initialized (found existing {})", .0.display())]
    AlreadyInitialized(PathBuf),
    /// The state directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    Io {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The configuration file exists but is unusable.
    #[error("{0}")]
    Config(String),
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] LoadError),
    /// The saved progress could not be loaded.
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// An advising session rooted at a directory.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
    engine: Engine,
    /// Set by the engine observer whenever progress changes.
    dirty: Rc<Cell<bool>>,
}

impl Workspace {
    /// Create the `.advisor` directory and a default configuration.
    ///
    /// Returns the path of the written config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace already exists or the files cannot
    /// be written.
    #[instrument]
    pub fn init(root: &Path, catalog: Option<PathBuf>) -> Result<PathBuf, OpenError> {
        let state_dir = root.join(STATE_DIR);
        if state_dir.exists() {
            return Err(OpenError::AlreadyInitialized(state_dir));
        }

        std::fs::create_dir_all(&state_dir).map_err(|source| OpenError::Io {
            path: state_dir.clone(),
            source,
        })?;

        let mut config = Config::default();
        if let Some(catalog) = catalog {
            config.set_catalog(catalog);
        }

        let config_path = state_dir.join(CONFIG_FILE);
        config.save(&config_path).map_err(OpenError::Config)?;

        Ok(config_path)
    }

    /// Open the workspace at `root`.
    ///
    /// A missing configuration file falls back to the defaults. Saved
    /// progress, if any, is replayed into the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unreadable, the catalog
    /// cannot be loaded, or the progress file is corrupt.
    #[instrument]
    pub fn open(root: PathBuf) -> Result<Self, OpenError> {
        let config = Self::read_config(&root)?;
        let catalog = load_catalog(&config.catalog_path(&root), config.strict)?;
        let mut engine = Engine::new(catalog);

        if let Some(progress) = Progress::load(&progress_path(&root))? {
            let restore = progress.restore(&mut engine);
            if restore.catalog_changed {
                tracing::warn!(
                    "The catalog has changed since progress was last saved. Review your completed courses."
                );
            }
            tracing::debug!(restored = restore.restored, "restored saved progress");
        }

        let dirty = Rc::new(Cell::new(false));
        {
            let dirty = Rc::clone(&dirty);
            engine.on_change(move |change| {
                match change {
                    Change::Completed { code, evicted } if !evicted.is_empty() => {
                        tracing::info!(%code, ?evicted, "marked complete, replacing exclusive choice");
                    }
                    Change::Completed { code, .. } => tracing::info!(%code, "marked complete"),
                    Change::Uncompleted { code } => tracing::info!(%code, "unmarked"),
                    Change::Reset => tracing::info!("progress reset"),
                }
                dirty.set(true);
            });
        }

        Ok(Self {
            root,
            config,
            engine,
            dirty,
        })
    }

    /// Read the configuration of the workspace at `root` without loading the
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn read_config(root: &Path) -> Result<Config, OpenError> {
        load_config(root)
    }

    /// The workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The workspace configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The eligibility engine.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The eligibility engine, for mutation.
    pub const fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Path of the progress file.
    #[must_use]
    pub fn progress_path(&self) -> PathBuf {
        progress_path(&self.root)
    }

    /// Save progress if it changed since the workspace was opened or last
    /// flushed.
    ///
    /// Returns `true` if the progress file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the progress file cannot be written.
    #[instrument(level = "debug", skip(self))]
    pub fn flush(&self) -> Result<bool, ProgressError> {
        if !self.dirty.get() {
            return Ok(false);
        }

        Progress::capture(&self.engine).save(&self.progress_path())?;
        self.dirty.set(false);
        Ok(true)
    }
}

fn progress_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(PROGRESS_FILE)
}

fn load_config(root: &Path) -> Result<Config, OpenError> {
    let path = root.join(STATE_DIR).join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(&path).map_err(OpenError::Config)
}
