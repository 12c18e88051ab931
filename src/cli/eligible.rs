use std::path::PathBuf;

use advisor::{Course, Engine, Workspace};
use serde::Serialize;
use tracing::instrument;

use super::{
    terminal::{is_narrow, plural, Colorize},
    OutputFormat,
};

/// Command arguments for `advise eligible`.
#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Case-insensitive substring match against code and title
    #[arg(long)]
    filter: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Row<'a> {
    code: &'a str,
    title: &'a str,
    credits: u32,
    category: String,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let rows = self.rows(workspace.engine());

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => Self::output_table(&rows),
        }

        Ok(())
    }

    fn rows<'a>(&self, engine: &'a Engine) -> Vec<Row<'a>> {
        let catalog = engine.catalog();
        let matching: Vec<&Course> = match &self.filter {
            Some(query) => catalog.search(query).collect(),
            None => catalog.courses().iter().collect(),
        };

        let eligible = engine.compute_eligibility();
        let mut rows: Vec<_> = matching
            .into_iter()
            .filter(|course| eligible.contains(&course.code))
            .map(|course| Row {
                code: course.code.as_str(),
                title: &course.title,
                credits: course.credits,
                category: catalog.category_label(course),
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(b.code));
        rows.dedup_by(|a, b| a.code == b.code);
        rows
    }

    fn output_table(rows: &[Row<'_>]) {
        if rows.is_empty() {
            println!("No eligible courses.");
            return;
        }

        let narrow = is_narrow();
        for row in rows {
            if narrow {
                println!("{} ({} cr)", row.code.info(), row.credits);
                println!("  {}", row.title);
            } else {
                println!(
                    "{:<10} {:<40} {:>3} cr  {}",
                    row.code.info(),
                    row.title,
                    row.credits,
                    row.category.dim()
                );
            }
        }

        let credits: u32 = rows.iter().map(|row| row.credits).sum();
        println!();
        println!(
            "{}",
            format!("{} eligible, {credits} credits", plural(rows.len(), "course")).dim()
        );
    }
}
