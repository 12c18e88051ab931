//! Styling for terminal output.
//!
//! Colour is decided once per process from stdout's capabilities, so piping
//! `advise` into another program yields plain text.

use std::sync::OnceLock;

use advisor::CourseStatus;
use owo_colors::{OwoColorize, Style};

/// Below this many columns, tables fall back to one field per line.
const NARROW_COLUMNS: u16 = 60;

/// Width of the status column in tables.
const BADGE_WIDTH: usize = 10;

fn color_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| supports_color::on(supports_color::Stream::Stdout).is_some())
}

/// Whether stdout is a terminal narrower than [`NARROW_COLUMNS`].
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

fn paint(text: &str, style: Style, enabled: bool) -> String {
    if enabled {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Semantic colours for anything that reads as text.
pub trait Colorize: AsRef<str> {
    /// Apply `style` when stdout supports colour.
    fn styled(&self, style: Style) -> String {
        paint(self.as_ref(), style, color_enabled())
    }

    /// Completed work and healthy results.
    fn success(&self) -> String {
        self.styled(Style::new().green())
    }

    /// Locks, evictions and other things worth a second look.
    fn warning(&self) -> String {
        self.styled(Style::new().yellow())
    }

    /// Failures and unmet requirements.
    fn error(&self) -> String {
        self.styled(Style::new().red().bold())
    }

    /// Course codes and courses that can be taken next.
    fn info(&self) -> String {
        self.styled(Style::new().cyan())
    }

    /// Secondary text such as titles and hints.
    fn dim(&self) -> String {
        self.styled(Style::new().dimmed())
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {}

fn status_style(status: CourseStatus) -> Style {
    match status {
        CourseStatus::Completed => Style::new().green(),
        CourseStatus::Eligible => Style::new().cyan(),
        CourseStatus::Locked => Style::new().yellow(),
        CourseStatus::Ineligible => Style::new().dimmed(),
    }
}

/// Fixed-width, coloured status label for table output.
pub fn status_badge(status: CourseStatus) -> String {
    format!("{status:<BADGE_WIDTH$}").styled(status_style(status))
}

/// "1 course" / "3 courses".
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
