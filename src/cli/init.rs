use std::path::{Path, PathBuf};

use advisor::Workspace;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Catalog file, relative to the workspace root
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut config = advisor::Config::default();
        if let Some(catalog) = &self.catalog {
            config.set_catalog(catalog.clone());
        }
        let catalog_path = config.catalog_path(root);

        let config_path = Workspace::init(root, self.catalog)?;

        println!("Initialized advising workspace in {}", root.display());
        println!(
            "  Created: {}",
            config_path.strip_prefix(root).unwrap_or(&config_path).display()
        );

        let workspace = Workspace::open(root.to_path_buf());
        println!();
        match workspace {
            Ok(workspace) => {
                let program = workspace.engine().catalog().program();
                println!(
                    "Loaded {} ({} courses)",
                    program.name,
                    workspace.engine().catalog().courses().len()
                );
                println!();
                println!("Next steps:");
                println!("  advise eligible        # See what you can take now");
                println!("  advise mark CS101      # Record a completed course");
            }
            Err(e) => {
                tracing::warn!("{e}");
                println!("Next steps:");
                println!("  Place the catalog at {}", catalog_path.display());
                println!("  advise validate        # Check the catalog");
            }
        }

        Ok(())
    }
}
