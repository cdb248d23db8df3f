//! Terminal colorization for diagnostics
//!
//! Applies ANSI escape codes to diagnostic reports using crossterm.

use crossterm::style::{Color, Stylize};
use wardley::{Diagnostic, Diagnostics, Severity};

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Format one diagnostic as `severity [stage]: message`
///
/// With `colorize`, the severity is colored (yellow warnings, red errors) and
/// the stage is dimmed.
pub fn format_diagnostic(diagnostic: &Diagnostic, colorize: bool) -> String {
    if !colorize {
        return diagnostic.to_string();
    }
    format!(
        "{} {}: {}",
        diagnostic
            .severity
            .to_string()
            .with(severity_color(diagnostic.severity))
            .bold(),
        format!("[{}]", diagnostic.stage).dark_grey(),
        diagnostic.message
    )
}

/// Format a whole report, one diagnostic per line
pub fn format_diagnostics(diagnostics: &Diagnostics, colorize: bool) -> String {
    diagnostics
        .iter()
        .map(|d| format_diagnostic(d, colorize))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validation summary line
pub fn status_line(ok: bool, message: &str, colorize: bool) -> String {
    let (mark, color) = if ok {
        ("✓", Color::Green)
    } else {
        ("✗", Color::Red)
    };
    if colorize {
        format!("{} {}", mark.with(color), message)
    } else {
        format!("{} {}", mark, message)
    }
}
