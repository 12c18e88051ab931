use std::path::PathBuf;

mod eligible;
mod init;
mod list;
mod mark;
mod reset;
mod show;
mod status;
mod terminal;
mod validate;

use advisor::CourseCode;
use clap::ArgAction;

/// Parse a course code from a command-line argument.
///
/// The spelling is kept as typed; commands match it against the catalog
/// with [`advisor::Catalog::resolve`], which ignores case.
fn parse_code(s: &str) -> Result<CourseCode, String> {
    s.trim().parse().map_err(|e| format!("{e}"))
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the advising workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(status::Command::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show program progress (default)
    Status(status::Command),

    /// Initialize a new advising workspace
    Init(init::Command),

    /// Mark courses as completed
    ///
    /// Completing a course from a set of exclusive choices replaces any
    /// other completed course from the same set.
    Mark(mark::Mark),

    /// Mark courses as not completed
    Unmark(mark::Unmark),

    /// Clear all completed courses
    Reset(reset::Command),

    /// List the courses that can be taken next
    Eligible(eligible::Command),

    /// List courses grouped by category
    List(list::Command),

    /// Show detailed information about a course
    Show(show::Command),

    /// Check the catalog for inconsistencies
    Validate(validate::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init(command) => command.run(&root)?,
            Self::Mark(command) => command.run(root)?,
            Self::Unmark(command) => command.run(root)?,
            Self::Reset(command) => command.run(root)?,
            Self::Eligible(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Validate(command) => command.run(&root)?,
        }
        Ok(())
    }
}
