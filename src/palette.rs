//! Color palette and styling for CLI output.
//!
//! Every command renders through these helpers so that technicians, groups
//! and plan outcomes look the same everywhere. Each `fmt_*` helper returns
//! plain text when color is disabled.

use owo_colors::{OwoColorize, Style};

/// Style for technician names, the primary identifier in every listing.
pub fn technician() -> Style {
    Style::new().cyan().bold()
}

/// Style for group names.
pub fn group() -> Style {
    Style::new().magenta().bold()
}

/// Style for section headings like "Summary:".
pub fn heading() -> Style {
    Style::new().white().bold()
}

/// Style for labels like "Dry run:" or "mode:".
pub fn label() -> Style {
    Style::new().blue()
}

/// Style for remote ids and other secondary detail.
pub fn detail() -> Style {
    Style::new().dimmed()
}

/// Style for ready plans and complete coverage.
pub fn status_ok() -> Style {
    Style::new().green()
}

/// Style for skipped technicians and pending additions.
pub fn status_skip() -> Style {
    Style::new().yellow()
}

/// Style for failed plans and pending removals.
pub fn status_error() -> Style {
    Style::new().red()
}

/// Style for warning text such as missing labels.
pub fn warning() -> Style {
    Style::new().yellow()
}

/// Apply a style when color is enabled.
fn styled(text: &str, style: Style, use_color: bool) -> String {
    if use_color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Format a technician name with styling.
pub fn fmt_technician(name: &str, use_color: bool) -> String {
    styled(name, technician(), use_color)
}

/// Format a group name with styling.
pub fn fmt_group(name: &str, use_color: bool) -> String {
    styled(name, group(), use_color)
}

/// Format a section heading with styling.
pub fn fmt_heading(text: &str, use_color: bool) -> String {
    styled(text, heading(), use_color)
}

/// Format a label with styling.
pub fn fmt_label(text: &str, use_color: bool) -> String {
    styled(text, label(), use_color)
}

/// Format secondary detail with styling.
pub fn fmt_detail(text: &str, use_color: bool) -> String {
    styled(text, detail(), use_color)
}

/// Format a success marker or count.
pub fn fmt_ok(text: &str, use_color: bool) -> String {
    styled(text, status_ok(), use_color)
}

/// Format a skip marker or pending addition.
pub fn fmt_skip(text: &str, use_color: bool) -> String {
    styled(text, status_skip(), use_color)
}

/// Format an error marker or pending removal.
pub fn fmt_error(text: &str, use_color: bool) -> String {
    styled(text, status_error(), use_color)
}

/// Format warning text with styling.
pub fn fmt_warning(text: &str, use_color: bool) -> String {
    styled(text, warning(), use_color)
}

#[cfg(test)]
mod tests {
    use super::{fmt_error, fmt_technician};

    #[test]
    fn plain_text_without_color() {
        assert_eq!(fmt_technician("Maria", false), "Maria");
        assert_eq!(fmt_error("ERROR", false), "ERROR");
    }

    #[test]
    fn escapes_with_color() {
        let styled = fmt_technician("Maria", true);
        assert!(styled.contains("Maria"));
        assert!(styled.starts_with('\u{1b}'));
    }
}
