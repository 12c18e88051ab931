use std::path::PathBuf;

use advisor::{CourseCode, Workspace};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Mark {
    /// Codes of the completed courses
    #[arg(required = true, value_parser = super::parse_code)]
    codes: Vec<CourseCode>,
}

#[derive(Debug, clap::Parser)]
pub struct Unmark {
    /// Codes of the courses to unmark
    #[arg(required = true, value_parser = super::parse_code)]
    codes: Vec<CourseCode>,
}

impl Mark {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        toggle_all(root, &self.codes, true)
    }
}

impl Unmark {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        toggle_all(root, &self.codes, false)
    }
}

/// Toggle every code, then save once.
///
/// Codes are matched against the catalog ignoring case. Unknown codes are
/// reported but do not stop the remaining codes from being applied.
fn toggle_all(root: PathBuf, codes: &[CourseCode], completed: bool) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(root)?;
    let mut unknown = Vec::new();

    for code in codes {
        let Some(course) = workspace.engine().catalog().resolve(code) else {
            eprintln!("{}", format!("course {code} is not in the catalog").error());
            unknown.push(code.as_str());
            continue;
        };
        let code = course.code.clone();
        let title = course.title.clone();

        let toggle = workspace
            .engine_mut()
            .toggle_completion(&code, completed)?;

        match (completed, toggle.changed) {
            (true, true) => println!("{} {code} {}", "✓".success(), title.dim()),
            (false, true) => println!("{} {code} {}", "✗".warning(), title.dim()),
            (true, false) => println!("{code} is already marked complete"),
            (false, false) => println!("{code} is not marked complete"),
        }

        for evicted in &toggle.evicted {
            println!(
                "  {} {evicted} (only one course from this set can be completed)",
                "replaced".warning()
            );
        }
    }

    if workspace.flush()? {
        tracing::debug!("saved progress to {}", workspace.progress_path().display());
    }

    if !unknown.is_empty() {
        anyhow::bail!("unknown course code(s): {}", unknown.join(", "));
    }

    Ok(())
}
