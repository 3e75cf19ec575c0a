//! Output formatting and writing utilities
//!
//! Results are rendered either as human-readable tables or in one of the
//! machine formats (JSON, pretty JSON, YAML). Listings become one row per
//! object; single objects become a two-column field/value table.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::trace;

/// Columns shown by `deployment list`
pub const DEPLOYMENT_COLUMNS: &[&str] = &[
    "uuid",
    "status",
    "task",
    "creationTime",
    "createdBy",
    "cloudProviderName",
];

/// Columns shown by `resource list`
pub const RESOURCE_COLUMNS: &[&str] = &[
    "uuid",
    "state",
    "toscaNodeType",
    "toscaNodeName",
    "creationTime",
    "requiredBy",
];

/// Trait for formatting serializable values
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // tables are built by the writer; anything else falls back to pretty JSON
            OutputFormat::Table => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles formatting and display
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && std::io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(format: OutputFormat, use_color: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet: false,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Table {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message to stderr
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.use_color {
            eprintln!("{} {}", "Warning:".yellow().bold(), message);
        } else {
            eprintln!("Warning: {}", message);
        }
        Ok(())
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a listing; tables show only `columns`, machine formats the full objects
    pub fn list(&mut self, columns: &[&str], items: &[Value]) -> Result<()> {
        if self.format != OutputFormat::Table {
            return self.data(&items);
        }

        let rows = items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|column| format_cell(item.get(*column)))
                    .collect()
            })
            .collect();
        self.table(columns, rows)
    }

    /// Write a single object as a field/value table
    pub fn show(&mut self, document: &Value) -> Result<()> {
        if self.format != OutputFormat::Table {
            return self.data(document);
        }

        self.table(&["Field", "Value"], field_rows(document))
    }

    /// Write free text; machine formats wrap it in a JSON string
    pub fn text(&mut self, text: &str) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.write(text),
            _ => self.data(&text),
        }
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress || self.format != OutputFormat::Table {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a table
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        let (header_row, body) = render_table(headers, &rows);

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }
        for line in body {
            self.writeln(&line)?;
        }

        Ok(())
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Lay out a table; returns the header line and the separator plus body lines
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> (String, Vec<String>) {
    // Calculate column widths
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let pad = |i: usize, cell: &str| match widths.get(i) {
        Some(width) => format!("{:width$}", cell, width = *width),
        None => cell.to_string(),
    };

    let header_row = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(i, h))
        .collect::<Vec<_>>()
        .join(" │ ");

    let mut lines = vec![widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─")];

    lines.extend(rows.iter().map(|row| {
        row.iter()
            .enumerate()
            .map(|(i, cell)| pad(i, cell))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    }));

    (header_row.trim_end().to_string(), lines)
}

/// One sorted row per top-level key of `document`
fn field_rows(document: &Value) -> Vec<Vec<String>> {
    match document {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|key| vec![key.clone(), format_cell(map.get(key))])
                .collect()
        }
        other => vec![vec![String::new(), format_cell(Some(other))]],
    }
}

/// Render a value for a table cell. Missing fields are blank and nested
/// mappings become `key='value', ...` with sorted keys.
fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            entries
                .into_iter()
                .map(|(k, v)| format!("{}='{}'", k, format_cell(Some(v))))
                .collect::<Vec<_>>()
                .join(", ")
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format_cell(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}
