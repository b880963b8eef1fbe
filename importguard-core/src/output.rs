use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Valid options are: human, json", s)),
        }
    }
}

pub trait OutputFormatter {
    fn format(&self, format: OutputFormat) -> String;
}

pub struct TableOutput {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableOutput {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl OutputFormatter for TableOutput {
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.format_human(),
            OutputFormat::Json => self.format_json(),
        }
    }
}

impl TableOutput {
    fn format_human(&self) -> String {
        let mut output = String::new();

        let mut widths = self.headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        for (i, header) in self.headers.iter().enumerate() {
            if i > 0 {
                output.push_str(" │ ");
            }
            // pad before colouring, escape codes would count towards the width
            let padded = format!("{:width$}", header, width = widths[i]);
            output.push_str(&padded.cyan().bold().to_string());
        }
        output.push('\n');

        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                output.push_str("─┼─");
            }
            output.push_str(&"─".repeat(*width));
        }
        output.push('\n');

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    output.push_str(" │ ");
                }
                if i < widths.len() {
                    output.push_str(&format!("{:width$}", cell, width = widths[i]));
                } else {
                    output.push_str(cell);
                }
            }
            output.push('\n');
        }

        output
    }

    fn format_json(&self) -> String {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row.iter())
                    .map(|(header, cell)| (header.to_lowercase(), serde_json::Value::String(cell.clone())))
                    .collect()
            })
            .collect();

        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }
}
