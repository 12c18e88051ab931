use std::{collections::BTreeSet, path::PathBuf};

use advisor::{CourseCode, CourseStatus, Engine, Workspace};
use serde::Serialize;
use tracing::instrument;

use super::{
    terminal::{is_narrow, status_badge, Colorize},
    OutputFormat,
};

/// Command arguments for `advise list`.
#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Case-insensitive substring match against code and title
    #[arg(long)]
    filter: Option<String>,

    /// Only show courses in this category (id, case-insensitive)
    #[arg(long, value_name = "ID")]
    category: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Section<'a> {
    id: &'a str,
    name: &'a str,
    courses: Vec<Row<'a>>,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    code: &'a str,
    title: &'a str,
    credits: u32,
    status: CourseStatus,
    prerequisites: String,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let sections = self.sections(workspace.engine());

        if let Some(category) = &self.category {
            let known = workspace
                .engine()
                .catalog()
                .categories()
                .iter()
                .any(|c| c.id.eq_ignore_ascii_case(category));
            if !known {
                anyhow::bail!("unknown category '{category}'");
            }
        }

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sections)?),
            OutputFormat::Table => Self::output_table(&sections),
        }

        Ok(())
    }

    fn sections<'a>(&self, engine: &'a Engine) -> Vec<Section<'a>> {
        let catalog = engine.catalog();
        let matching: Option<BTreeSet<&CourseCode>> = self
            .filter
            .as_deref()
            .map(|query| catalog.search(query).map(|course| &course.code).collect());

        catalog
            .grouped_by_category()
            .into_iter()
            .filter(|(category, _)| {
                self.category
                    .as_ref()
                    .is_none_or(|wanted| category.id.eq_ignore_ascii_case(wanted))
            })
            .map(|(category, courses)| Section {
                id: &category.id,
                name: &category.name,
                courses: courses
                    .into_iter()
                    .filter(|course| {
                        matching
                            .as_ref()
                            .is_none_or(|matching| matching.contains(&course.code))
                    })
                    .map(|course| Row {
                        code: course.code.as_str(),
                        title: &course.title,
                        credits: course.credits,
                        status: engine.course_status(course),
                        prerequisites: course.prerequisite_summary(),
                    })
                    .collect(),
            })
            .filter(|section| !section.courses.is_empty())
            .collect()
    }

    fn output_table(sections: &[Section<'_>]) {
        if sections.is_empty() {
            println!("No matching courses.");
            return;
        }

        let narrow = is_narrow();
        for (index, section) in sections.iter().enumerate() {
            if index > 0 {
                println!();
            }
            println!("{}", section.name);
            println!("{}", "─".repeat(section.name.chars().count()).dim());

            for row in &section.courses {
                if narrow {
                    println!("{} {} ({} cr)", status_badge(row.status), row.code, row.credits);
                    println!("  {}", row.title);
                } else {
                    println!(
                        "{} {:<10} {:<40} {:>3} cr",
                        status_badge(row.status),
                        row.code,
                        row.title,
                        row.credits
                    );
                }
                println!("  {}", format!("Prerequisites: {}", row.prerequisites).dim());
            }
        }
    }
}
