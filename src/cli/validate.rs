use std::path::{Path, PathBuf};

use advisor::{Catalog, Issue, Severity, Workspace};
use anyhow::Context;
use clap::Parser;
use tracing::instrument;

use super::terminal::{plural, Colorize};

#[derive(Debug, Parser)]
#[command(about = "Check the catalog for broken references and other inconsistencies")]
pub struct Command {
    /// Catalog file to check instead of the configured one
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let path = match &self.catalog {
            Some(path) => root.join(path),
            None => Workspace::read_config(root)?.catalog_path(root),
        };

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let catalog = Catalog::from_json(&json)
            .with_context(|| format!("failed to parse catalog {}", path.display()))?;

        let issues = catalog.validate();

        match self.output {
            OutputFormat::Table => self.output_table(&path, &catalog, &issues),
            OutputFormat::Json => Self::output_json(&path, &issues)?,
            OutputFormat::Summary => Self::output_summary(&issues),
        }

        if issues.iter().any(|issue| issue.severity() == Severity::Error) {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, path: &Path, catalog: &Catalog, issues: &[Issue]) {
        if self.quiet {
            return;
        }

        println!("Validating {}...\n", path.display());
        println!(
            "  {}, {} categories",
            plural(catalog.courses().len(), "course"),
            catalog.categories().len()
        );
        println!();

        if issues.is_empty() {
            println!("{}", "Catalog is healthy (0 issues)".success());
            return;
        }

        for issue in issues {
            match issue.severity() {
                Severity::Error => println!("{} {issue}", "✗ error:  ".error()),
                Severity::Warning => println!("{} {issue}", "⚠ warning:".warning()),
            }
        }

        let (errors, warnings) = count(issues);
        println!(
            "\n{}",
            format!(
                "Summary: {}, {}",
                plural(errors, "error"),
                plural(warnings, "warning")
            )
            .warning()
        );
        if errors > 0 {
            println!(
                "{}",
                "Errors prevent the catalog from loading unless `strict = false` is set.".dim()
            );
        }
    }

    fn output_json(path: &Path, issues: &[Issue]) -> anyhow::Result<()> {
        use serde_json::json;

        let (errors, warnings) = count(issues);
        let entries: Vec<_> = issues
            .iter()
            .map(|issue| {
                json!({
                    "severity": match issue.severity() {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                    },
                    "message": issue.to_string(),
                })
            })
            .collect();

        let output = json!({
            "catalog": path,
            "status": if errors == 0 { "healthy" } else { "issues_found" },
            "issues": entries,
            "summary": {
                "errors": errors,
                "warnings": warnings,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(issues: &[Issue]) {
        let (errors, warnings) = count(issues);
        println!("errors={errors} warnings={warnings}");
    }
}

fn count(issues: &[Issue]) -> (usize, usize) {
    let errors = issues
        .iter()
        .filter(|issue| issue.severity() == Severity::Error)
        .count();
    (errors, issues.len() - errors)
}
