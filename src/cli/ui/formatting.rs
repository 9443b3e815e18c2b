use std::fmt;

use colored::Colorize;

use crate::cli::output::{current_preferences, OutputPreferences};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Style {
    Header,
    Detail,
    Warning,
}

pub struct Formatter {
    prefs: OutputPreferences,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self::with_preferences(current_preferences())
    }

    pub fn with_preferences(prefs: OutputPreferences) -> Self {
        Self { prefs }
    }

    pub fn header_text(&self, title: impl fmt::Display) -> String {
        self.apply_style(Style::Header, title)
    }

    pub fn detail_text(&self, message: impl fmt::Display) -> String {
        self.apply_style(Style::Detail, message)
    }

    pub fn warning_text(&self, message: impl fmt::Display) -> String {
        self.apply_style(Style::Warning, message)
    }

    pub fn pointer(&self) -> &'static str {
        if self.prefs.plain_mode {
            ">"
        } else {
            "▸"
        }
    }

    fn apply_style(&self, style: Style, message: impl fmt::Display) -> String {
        match style {
            Style::Header => self.colorize(format!("=== {message} ==="), style),
            Style::Warning => self.decorate("⚠", "WARNING:", message, style),
            Style::Detail => self.colorize(message.to_string(), style),
        }
    }

    fn decorate(
        &self,
        icon: &str,
        plain_label: &str,
        message: impl fmt::Display,
        style: Style,
    ) -> String {
        if self.prefs.plain_mode || self.prefs.screen_reader_mode {
            format!("{plain_label} {message}")
        } else {
            self.colorize(format!("{icon} {message}"), style)
        }
    }

    fn colorize(&self, text: String, style: Style) -> String {
        if self.prefs.plain_mode || self.prefs.screen_reader_mode {
            return text;
        }
        match style {
            Style::Warning => text.yellow().to_string(),
            Style::Header => text.bold().to_string(),
            Style::Detail => text.dimmed().to_string(),
        }
    }

    pub fn menu_hint(&self) -> &'static str {
        "(Arrow keys to move, Enter to select, Esc to cancel)"
    }

    pub fn text_hint(&self) -> &'static str {
        "(Enter keeps the shown value; :back, :next, :help, :clear, :cancel)"
    }

    pub fn format_two_column_row(&self, label: &str, description: &str, width: usize) -> String {
        if description.is_empty() {
            return label.to_string();
        }
        format!("{:<width$}  {}", label, description, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Formatter {
        Formatter::with_preferences(OutputPreferences {
            plain_mode: true,
            ..OutputPreferences::default()
        })
    }

    #[test]
    fn plain_formatter_uses_ascii() {
        let formatter = plain();
        assert_eq!(formatter.pointer(), ">");
        assert_eq!(formatter.header_text("Step 1 of 3"), "=== Step 1 of 3 ===");
        assert_eq!(formatter.warning_text("careful"), "WARNING: careful");
    }

    #[test]
    fn two_column_rows_align() {
        let formatter = plain();
        assert_eq!(formatter.format_two_column_row("Yes", "Keep it", 6), "Yes     Keep it");
        assert_eq!(formatter.format_two_column_row("Yes", "", 6), "Yes");
    }
}
