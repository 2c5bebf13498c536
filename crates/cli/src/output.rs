// Output formatting for CLI
//
// Commands hand back a serializable outcome; text output is built by each
// outcome, JSON and YAML come straight from serde.

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render `value`, using `text` for the text format
    pub fn render<T, F>(&self, value: &T, text: F) -> Result<String, CliError>
    where
        T: Serialize,
        F: FnOnce() -> String,
    {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map(|s| s + "\n")
                .map_err(|e| CliError::Output(e.to_string())),
            OutputFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| CliError::Output(e.to_string()))
            }
            OutputFormat::Text => Ok(text()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// A simple key-value line for text output
pub fn field(label: &str, value: &str) -> String {
    format!("{:<14} {}\n", format!("{}:", label), value)
}

/// A table header line
pub fn table_header(columns: &[(&str, usize)]) -> String {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", header.trim_end())
}

/// A table row line; cells wider than their column are cut with "..."
pub fn table_row(values: &[(&str, usize)]) -> String {
    let row: String = values
        .iter()
        .map(|(val, width)| {
            let s = if val.chars().count() > *width {
                let kept: String = val.chars().take(width.saturating_sub(3)).collect();
                format!("{}...", kept)
            } else {
                val.to_string()
            };
            format!("{:<width$}", s, width = width)
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", row.trim_end())
}
