use std::path::PathBuf;

use advisor::Workspace;
use dialoguer::Confirm;
use tracing::instrument;

use super::terminal::{plural, Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;

        let completed = workspace.engine().completed().count();
        if completed == 0 {
            println!("Nothing to reset.");
            return Ok(());
        }

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Clear {} and all exclusive choices?",
                    plural(completed, "completed course")
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Reset cancelled.");
                return Ok(());
            }
        }

        workspace.engine_mut().reset_all();
        workspace.flush()?;

        println!("{}", format!("Cleared {}.", plural(completed, "course")).success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::workspace_dir;

    #[test]
    fn reset_with_yes_clears_saved_progress() {
        let tmp = workspace_dir();
        {
            let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
            workspace.engine_mut().toggle_completion("CS101", true).unwrap();
            workspace.engine_mut().toggle_completion("MATH201", true).unwrap();
            workspace.flush().unwrap();
        }

        Command { yes: true }.run(tmp.path().to_path_buf()).unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(workspace.engine().completed().count(), 0);
        assert_eq!(workspace.engine().lock_for("calc"), None);
    }

    #[test]
    fn reset_on_empty_workspace_does_not_prompt() {
        let tmp = workspace_dir();
        Command { yes: false }.run(tmp.path().to_path_buf()).unwrap();
        assert!(!tmp.path().join(".advisor/progress.toml").exists());
    }
}
