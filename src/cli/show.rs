use std::{path::PathBuf, process};

use advisor::{Course, CourseCode, Engine, Workspace};
use clap::Parser;
use tracing::instrument;

use super::terminal::{status_badge, Colorize};

#[derive(Debug, Parser)]
#[command(about = "Display detailed information about a course")]
pub struct Command {
    /// The code of the course to display
    #[clap(value_parser = super::parse_code)]
    code: CourseCode,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let engine = workspace.engine();

        let Some(course) = engine.catalog().resolve(&self.code) else {
            eprintln!("Course {} not found", self.code);
            process::exit(1);
        };

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(engine, course),
            OutputFormat::Json => Self::output_json(engine, course)?,
        }

        Ok(())
    }

    fn output_pretty(engine: &Engine, course: &Course) {
        let catalog = engine.catalog();

        // Header
        println!("# {}", course.code);
        println!("{}\n", course.title);

        println!("  Status:    {}", status_badge(engine.course_status(course)));
        println!("  Credits:   {}", course.credits);
        println!("  Category:  {}", catalog.category_label(course));

        println!("\n{}", "Prerequisites".dim());
        if course.prerequisites.is_empty() {
            println!("  None");
        }
        for (requirement, met) in engine.requirement_statuses(course) {
            let marker = if met {
                "Met".success()
            } else {
                "Not met".error()
            };
            println!("  • {requirement} [{marker}]");
        }

        if let Some(group) = &course.exclusive_group {
            println!("\n{}", "Exclusive choice".dim());
            match catalog.exclusive_group(group) {
                Some(group) => {
                    println!("  {}", group.title);
                    if !group.description.is_empty() {
                        println!("  {}", group.description);
                    }
                }
                None => println!("  {group}"),
            }
            if let Some(holder) = engine.lock_for(group) {
                println!("  {} {holder}", "Locked to".warning());
            }
        }

        if !course.notes.is_empty() {
            println!("\n{}", "Notes".dim());
            for note in &course.notes {
                println!("  • {note}");
            }
        }

        if let Some(info) = &course.info {
            println!("\n{}", "Info".dim());
            println!("  {info}");
        }

        let unlocks = catalog.unlocks(&course.code);
        if !unlocks.is_empty() {
            println!("\n{}", "Required by".dim());
            for dependent in unlocks {
                println!("  • {} {}", dependent.code, dependent.title.dim());
            }
        }
    }

    fn output_json(engine: &Engine, course: &Course) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&Self::details(engine, course))?);
        Ok(())
    }

    fn details(engine: &Engine, course: &Course) -> serde_json::Value {
        use serde_json::json;

        let catalog = engine.catalog();
        let prerequisites: Vec<_> = engine
            .requirement_statuses(course)
            .map(|(requirement, met)| {
                json!({
                    "kind": requirement.kind.to_string(),
                    "courses": requirement.courses.iter().map(CourseCode::as_str).collect::<Vec<_>>(),
                    "detail": requirement.detail,
                    "label": requirement.to_string(),
                    "met": met,
                })
            })
            .collect();

        let exclusive_group = course.exclusive_group.as_ref().map(|group| {
            json!({
                "id": group,
                "title": catalog.exclusive_group(group).map(|g| &g.title),
                "locked_to": engine.lock_for(group).map(CourseCode::as_str),
            })
        });

        json!({
            "code": course.code.as_str(),
            "title": course.title,
            "credits": course.credits,
            "category": catalog.category_label(course),
            "status": engine.course_status(course),
            "prerequisites": prerequisites,
            "exclusive_group": exclusive_group,
            "notes": course.notes,
            "info": course.info,
            "unlocks": catalog
                .unlocks(&course.code)
                .iter()
                .map(|c| c.code.as_str())
                .collect::<Vec<_>>(),
        })
    }
}
