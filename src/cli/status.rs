use std::path::PathBuf;

use advisor::{CourseCode, Engine, Workspace};
use clap::Parser;
use tracing::instrument;

use super::{
    terminal::{is_narrow, plural, Colorize},
    OutputFormat,
};

/// An exclusive group as shown in the status table.
#[derive(Debug, PartialEq, Eq)]
struct Choice {
    title: String,
    description: String,
    locked_to: Option<String>,
}

#[derive(Debug, Parser, Default)]
#[command(about = "Show program progress and exclusive choices")]
pub struct Command {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let engine = workspace.engine();

        match self.output {
            OutputFormat::Json => Self::output_json(engine)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(engine),
            OutputFormat::Table => Self::output_table(engine),
        }

        Ok(())
    }

    /// Every declared exclusive group, followed by any locked group the
    /// catalog does not declare.
    fn choices(engine: &Engine) -> Vec<Choice> {
        let catalog = engine.catalog();
        let holder = |code: &CourseCode| {
            catalog
                .course(code)
                .map_or_else(|| code.to_string(), |c| format!("{code} – {}", c.title))
        };

        let mut choices: Vec<Choice> = catalog
            .exclusive_groups()
            .iter()
            .map(|group| Choice {
                title: group.title.clone(),
                description: group.description.clone(),
                locked_to: engine.lock_for(&group.id).map(holder),
            })
            .collect();

        choices.extend(
            engine
                .locks()
                .filter(|(group, _)| catalog.exclusive_group(group).is_none())
                .map(|(group, code)| Choice {
                    title: group.to_string(),
                    description: String::new(),
                    locked_to: Some(holder(code)),
                }),
        );

        choices
    }

    fn report(engine: &Engine) -> serde_json::Value {
        use serde_json::json;

        let program = engine.catalog().program();
        let summary = engine.summary();
        let choices: Vec<_> = engine
            .catalog()
            .exclusive_groups()
            .iter()
            .map(|group| {
                json!({
                    "group": group.id,
                    "title": group.title,
                    "description": group.description,
                    "locked_to": engine.lock_for(&group.id).map(CourseCode::as_str),
                })
            })
            .collect();
        let locks: Vec<_> = engine
            .locks()
            .map(|(group, code)| json!({"group": group, "course": code.as_str()}))
            .collect();

        json!({
            "program": {
                "name": program.name,
                "catalog_year": program.catalog_year,
                "total_credits": summary.total_credits,
            },
            "completed": {
                "courses": summary.completed_courses,
                "credits": summary.completed_credits,
                "codes": engine.completed().map(CourseCode::as_str).collect::<Vec<_>>(),
            },
            "eligible": summary.eligible_courses,
            "choices": choices,
            "locks": locks,
        })
    }

    fn output_json(engine: &Engine) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&Self::report(engine))?);
        Ok(())
    }

    fn output_quiet(engine: &Engine) {
        let summary = engine.summary();
        println!(
            "completed={} credits={}/{} eligible={} locks={}",
            summary.completed_courses,
            summary.completed_credits,
            summary.total_credits,
            summary.eligible_courses,
            engine.locks().count()
        );
    }

    fn output_table(engine: &Engine) {
        let program = engine.catalog().program();
        let summary = engine.summary();

        println!("{}", program.name);
        if !program.catalog_year.is_empty() {
            println!("{}", format!("Catalog {}", program.catalog_year).dim());
        }
        println!("{}", "──────────────────".dim());

        let credits = format!("{}/{}", summary.completed_credits, summary.total_credits);
        if is_narrow() {
            println!("Completed: {}", plural(summary.completed_courses, "course"));
            println!("Credits: {credits}");
            println!("Eligible: {}", summary.eligible_courses);
        } else {
            println!("{:<12} {}", "Completed", plural(summary.completed_courses, "course"));
            println!("{:<12} {credits}", "Credits");
            println!("{:<12} {}", "Eligible", summary.eligible_courses);
        }

        let choices = Self::choices(engine);
        if !choices.is_empty() {
            println!();
            println!("{}", "Course selection rules".dim());
            for choice in choices {
                match &choice.locked_to {
                    Some(course) => {
                        println!("  {}: {} {course}", choice.title, "Locked to".warning());
                    }
                    None => println!("  {}: {}", choice.title, "open".info()),
                }
                if !choice.description.is_empty() {
                    println!("    {}", choice.description.dim());
                }
            }
        }

        if summary.completed_courses == 0 {
            println!();
            println!("{}", "No courses completed yet. Mark one with 'advise mark CODE'.".dim());
            return;
        }

        if summary.total_credits > 0 && summary.completed_credits >= summary.total_credits {
            println!();
            println!("{} ✅", "Credit requirement met".success());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::workspace_dir;

    #[test]
    fn every_declared_group_is_listed_with_its_holder() {
        let tmp = workspace_dir();
        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();

        let open = Choice {
            title: "Calculus".to_string(),
            description: "Pick one calculus course.".to_string(),
            locked_to: None,
        };
        assert_eq!(Command::choices(workspace.engine()), [open]);

        workspace
            .engine_mut()
            .toggle_completion("MATH205", true)
            .unwrap();
        let choices = Command::choices(workspace.engine());
        assert_eq!(choices.len(), 1);
        assert_eq!(
            choices[0].locked_to.as_deref(),
            Some("MATH205 – Applied Calculus")
        );
    }

    #[test]
    fn undeclared_locked_groups_are_listed_after_declared_ones() {
        let tmp = workspace_dir();
        std::fs::write(
            tmp.path().join("program_data.json"),
            r#"{
                "program": {"name": "Loose"},
                "categories": [{"id": "core", "name": "Core"}],
                "exclusiveGroups": [{"id": "lab", "title": "Lab"}],
                "courses": [
                    {"code": "A1", "title": "A", "credits": 3, "category": "core",
                     "exclusiveGroup": "lab"},
                    {"code": "B1", "title": "B", "credits": 3, "category": "core",
                     "exclusiveGroup": "stray"}
                ]
            }"#,
        )
        .unwrap();
        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();
        workspace.engine_mut().toggle_completion("B1", true).unwrap();

        let choices = Command::choices(workspace.engine());
        let summary: Vec<_> = choices
            .iter()
            .map(|choice| (choice.title.as_str(), choice.locked_to.as_deref()))
            .collect();
        assert_eq!(summary, [("Lab", None), ("stray", Some("B1 – B"))]);
    }

    #[test]
    fn report_lists_completed_codes_choices_and_locks() {
        let tmp = workspace_dir();
        let mut workspace = Workspace::open(tmp.path().to_path_buf()).unwrap();

        let report = Command::report(workspace.engine());
        assert_eq!(report["program"]["name"], "Test Program");
        assert_eq!(report["completed"]["courses"], 0);
        assert_eq!(report["eligible"], 3);
        assert_eq!(report["choices"][0]["locked_to"], serde_json::Value::Null);
        assert_eq!(report["locks"], serde_json::json!([]));

        for code in ["CS101", "MATH201"] {
            workspace.engine_mut().toggle_completion(code, true).unwrap();
        }
        let report = Command::report(workspace.engine());
        assert_eq!(
            report["completed"]["codes"],
            serde_json::json!(["CS101", "MATH201"])
        );
        assert_eq!(report["completed"]["credits"], 7);
        assert_eq!(report["eligible"], 1);
        assert_eq!(report["choices"][0]["group"], "calc");
        assert_eq!(report["choices"][0]["locked_to"], "MATH201");
        assert_eq!(
            report["locks"],
            serde_json::json!([{"group": "calc", "course": "MATH201"}])
        );
    }

    #[test]
    fn runs_on_a_fresh_workspace() {
        let tmp = workspace_dir();
        Command::default().run(tmp.path().to_path_buf()).unwrap();
        Command {
            output: OutputFormat::Json,
            quiet: false,
        }
        .run(tmp.path().to_path_buf())
        .unwrap();
    }
}
