//! Output formatting for diff results.
//!
//! This module handles formatting diff results in various output formats
//! (terminal with colors, JSON, plain text, and the replayable patch text).
//! It provides control over how paths and values are displayed.
//!
//! # Examples
//!
//! ```
//! use ddiff_rs::{compute_diff, format_diff, DiffConfig, OutputFormat, OutputOptions, Value};
//!
//! let diff = compute_diff(&Value::from(42), &Value::from(43), &DiffConfig::default()).unwrap();
//!
//! let output = format_diff(&diff, &OutputFormat::Plain, &OutputOptions::default()).unwrap();
//! assert!(output.contains("42 → 43"));
//! ```

use colored::*;
use serde_json::json;

use crate::change::ChangeRecord;
use crate::diff::{Diff, DiffStats};
use crate::error::OutputError;
use crate::pointer::PathScheme;
use crate::serialize::{value_to_json, CompactFormat, TextFormat};
use crate::tree::Value;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored terminal output with ANSI escape codes
    Terminal,
    /// JSON document with the compact records and statistics
    Json,
    /// Plain text, no colors (suitable for piping)
    Plain,
    /// Length-prefixed text records that can be decoded and applied
    Patch,
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" => Ok(Self::Terminal),
            "json" => Ok(Self::Json),
            "plain" => Ok(Self::Plain),
            "patch" => Ok(Self::Patch),
            _ => Err(OutputError::UnknownFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Options for controlling output formatting.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Show full values as JSON instead of previews
    pub show_values: bool,
    /// Maximum length for previewed values (truncate if longer)
    pub max_value_length: usize,
    /// Notation used for paths
    pub scheme: PathScheme,
    /// Include replaced values in the JSON and patch formats
    pub audit: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            show_values: false,
            max_value_length: 80,
            scheme: PathScheme::Dotted,
            audit: false,
        }
    }
}

/// Formats a diff according to the specified format and options.
///
/// # Arguments
///
/// * `diff` - The diff to format
/// * `format` - The output format
/// * `options` - Formatting options
///
/// # Returns
///
/// Returns the formatted string on success, or an OutputError on failure.
pub fn format_diff(diff: &Diff, format: &OutputFormat, options: &OutputOptions) -> Result<String, OutputError> {
    match format {
        OutputFormat::Terminal => Ok(format_terminal(diff, options)),
        OutputFormat::Json => format_json(diff, options),
        OutputFormat::Plain => Ok(format_plain(diff, options)),
        OutputFormat::Patch => format_patch(diff, options),
    }
}

/// Formats a diff for terminal output with colors.
///
/// Color scheme:
/// - Added: green
/// - Removed: red
/// - Edited: yellow
/// - Moved: cyan
fn format_terminal(diff: &Diff, options: &OutputOptions) -> String {
    if diff.changes.is_empty() {
        return "No changes detected.".dimmed().to_string();
    }

    let mut output = String::new();
    for change in &diff.changes {
        output.push_str(&format_change_terminal(change, options));
        output.push('\n');
    }
    output.push('\n');
    output.push_str(&format_summary(&diff.stats));
    output
}

fn format_change_terminal(change: &ChangeRecord, options: &OutputOptions) -> String {
    let path = format_path(change, options);
    match change {
        ChangeRecord::Added { comparand, .. } => {
            let value = format_value(comparand, options);
            format!("{} {}: {}", "+".bright_green(), path.green(), value.green())
        }
        ChangeRecord::Removed { subject, .. } => {
            let value = format_value(subject, options);
            format!("{} {}: {}", "-".bright_red(), path.red(), value.red())
        }
        ChangeRecord::Edited {
            subject, comparand, ..
        } => format!(
            "{} {}: {} {} {}",
            "•".bright_yellow(),
            path.yellow(),
            format_value(subject, options).yellow(),
            "→".bright_yellow(),
            format_value(comparand, options).yellow()
        ),
        ChangeRecord::Moved {
            subject,
            comparand,
            origin,
            ..
        } => format!(
            "{} {}: {} {} {} {}",
            "↷".bright_cyan(),
            path.cyan(),
            format_value(subject, options).cyan(),
            "→".bright_cyan(),
            format_value(comparand, options).cyan(),
            format!("(from {})", origin).dimmed()
        ),
    }
}

/// Formats a diff as JSON.
///
/// The JSON structure includes both the records and statistics.
fn format_json(diff: &Diff, options: &OutputOptions) -> Result<String, OutputError> {
    let format = CompactFormat::new().scheme(options.scheme).audit(options.audit);
    let changes = diff
        .changes
        .iter()
        .map(|change| format.encode_record(change))
        .collect::<Result<Vec<_>, _>>()?;

    let output = json!({
        "changes": changes,
        "stats": diff.stats,
    });

    serde_json::to_string_pretty(&output).map_err(|e| OutputError::JsonSerializationError { source: e })
}

/// Formats a diff for plain text output (no colors).
fn format_plain(diff: &Diff, options: &OutputOptions) -> String {
    if diff.changes.is_empty() {
        return "No changes detected.".to_string();
    }

    let mut output = String::new();
    for change in &diff.changes {
        output.push_str(&format_change_plain(change, options));
        output.push('\n');
    }
    output.push('\n');
    output.push_str(&format_summary(&diff.stats));
    output
}

fn format_change_plain(change: &ChangeRecord, options: &OutputOptions) -> String {
    let path = format_path(change, options);
    match change {
        ChangeRecord::Added { comparand, .. } => {
            format!("+ {}: {}", path, format_value(comparand, options))
        }
        ChangeRecord::Removed { subject, .. } => {
            format!("- {}: {}", path, format_value(subject, options))
        }
        ChangeRecord::Edited {
            subject, comparand, ..
        } => format!(
            "• {}: {} → {}",
            path,
            format_value(subject, options),
            format_value(comparand, options)
        ),
        ChangeRecord::Moved {
            subject,
            comparand,
            origin,
            ..
        } => format!(
            "↷ {}: {} → {} (from {})",
            path,
            format_value(subject, options),
            format_value(comparand, options),
            origin
        ),
    }
}

/// One text record per line, in the configured notation.
fn format_patch(diff: &Diff, options: &OutputOptions) -> Result<String, OutputError> {
    let format = TextFormat::new().scheme(options.scheme).audit(options.audit);
    let mut output = format.encode(&diff.changes)?;
    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

/// Renders a record's path in the configured notation, or `(root)`.
fn format_path(change: &ChangeRecord, options: &OutputOptions) -> String {
    if change.path().is_empty() {
        return "(root)".to_string();
    }
    change.pointer_in(options.scheme)
}

/// Formats a value for display.
///
/// Previews are truncated to `max_value_length`; with `show_values` the whole
/// value is written as JSON when it can be.
fn format_value(value: &Value, options: &OutputOptions) -> String {
    if options.show_values {
        if let Ok(json) = value_to_json(value) {
            return json.to_string();
        }
    }
    value.preview(options.max_value_length)
}

/// Formats summary statistics.
fn format_summary(stats: &DiffStats) -> String {
    if stats.is_empty() {
        return "Summary: No changes".to_string();
    }

    let mut parts = Vec::new();
    if stats.added > 0 {
        parts.push(format!("{} added", stats.added));
    }
    if stats.removed > 0 {
        parts.push(format!("{} removed", stats.removed));
    }
    if stats.edited > 0 {
        parts.push(format!("{} edited", stats.edited));
    }
    if stats.moved > 0 {
        parts.push(format!("{} moved", stats.moved));
    }

    format!("Summary: {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Segment;

    fn edited_age() -> Diff {
        Diff::from(vec![ChangeRecord::edited(
            vec![Segment::from("age")],
            Value::from(30),
            Value::from(31),
        )])
    }

    #[test]
    fn test_format_path_schemes() {
        let change = ChangeRecord::added(
            vec![Segment::from("items"), Segment::Index(0), Segment::from("id")],
            Value::Null,
        );
        let mut options = OutputOptions::default();
        assert_eq!(format_path(&change, &options), ".items.[0].id");
        options.scheme = PathScheme::Pointer;
        assert_eq!(format_path(&change, &options), "#/items/0/id");
    }

    #[test]
    fn test_format_path_root() {
        let change = ChangeRecord::edited(vec![], Value::from(1), Value::from(2));
        assert_eq!(format_path(&change, &OutputOptions::default()), "(root)");
    }

    #[test]
    fn test_format_value_truncation() {
        let options = OutputOptions {
            max_value_length: 20,
            ..Default::default()
        };
        let formatted = format_value(&Value::from("a".repeat(100)), &options);
        assert_eq!(formatted.chars().count(), 20);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_show_values_writes_json() {
        let options = OutputOptions {
            show_values: true,
            ..Default::default()
        };
        let value = Value::from(serde_json::json!({"a": [1, 2]}));
        assert_eq!(format_value(&value, &options), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_format_summary_empty() {
        assert_eq!(format_summary(&DiffStats::new()), "Summary: No changes");
    }

    #[test]
    fn test_format_summary_with_changes() {
        let stats = DiffStats {
            added: 2,
            removed: 1,
            edited: 3,
            moved: 1,
        };
        assert_eq!(
            format_summary(&stats),
            "Summary: 2 added, 1 removed, 3 edited, 1 moved"
        );
    }

    #[test]
    fn test_format_plain_no_changes() {
        let output = format_plain(&Diff::new(), &OutputOptions::default());
        assert_eq!(output, "No changes detected.");
    }

    #[test]
    fn test_format_plain_with_changes() {
        let output = format_plain(&edited_age(), &OutputOptions::default());
        assert!(output.contains("• .age: 30 → 31"));
        assert!(output.contains("Summary: 1 edited"));
    }

    #[test]
    fn test_format_json() {
        let options = OutputOptions {
            audit: true,
            scheme: PathScheme::Pointer,
            ..Default::default()
        };
        let output = format_json(&edited_age(), &options).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["changes"][0]["kind"], "E");
        assert_eq!(parsed["changes"][0]["pointer"], "#/age");
        assert_eq!(parsed["changes"][0]["subject"], 30);
        assert_eq!(parsed["stats"]["edited"], 1);
    }

    #[test]
    fn test_format_patch() {
        let options = OutputOptions {
            scheme: PathScheme::Pointer,
            ..Default::default()
        };
        assert_eq!(format_patch(&edited_age(), &options).unwrap(), "E #/age 2 31\n");
        assert_eq!(format_patch(&Diff::new(), &options).unwrap(), "");
    }

    #[test]
    fn test_format_terminal_no_changes() {
        let output = format_terminal(&Diff::new(), &OutputOptions::default());
        assert!(output.contains("No changes"));
    }

    #[test]
    fn test_format_change_kinds() {
        let options = OutputOptions::default();

        let added = ChangeRecord::added(vec![Segment::from("new_field")], Value::from("value"));
        let output = format_change_plain(&added, &options);
        assert!(output.starts_with('+'));
        assert!(output.contains("new_field"));

        let removed = ChangeRecord::removed(vec![Segment::from("old_field")], Value::from("value"));
        let output = format_change_plain(&removed, &options);
        assert!(output.starts_with('-'));

        let moved = ChangeRecord::moved(vec![Segment::Index(3)], Value::from(1), Value::from(2), 0);
        let output = format_change_plain(&moved, &options);
        assert!(output.contains("(from 0)"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("PATCH".parse::<OutputFormat>().unwrap(), OutputFormat::Patch);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
