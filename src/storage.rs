mod catalog_file;
mod progress;
mod workspace;

pub use catalog_file::{load_catalog, LoadError};
pub use progress::{Progress, ProgressError, Restore};
pub use workspace::{OpenError, Workspace};
