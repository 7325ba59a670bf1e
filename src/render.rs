//! Text and CSV rendering shared by pages and the CLI

use chrono::{DateTime, Utc};
use std::fmt;

/// Failure to serialize a page for output
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown format '{}'. Use: table, json, csv", other)),
        }
    }
}

/// A titled table of already formatted cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    /// Aligned columns with a dashed separator under the header
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Header line plus one record per row
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();

        if let Some(title) = &self.title {
            writeln!(f, "{}", title)?;
        }

        writeln!(f, "{}", format_row(&self.headers, &widths))?;
        let total = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 3;
        writeln!(f, "{}", "-".repeat(total))?;

        if self.rows.is_empty() {
            writeln!(f, "(none)")?;
        }
        for row in &self.rows {
            writeln!(f, "{}", format_row(row, &widths))?;
        }
        Ok(())
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Euros with two decimals
pub fn money(amount: f64) -> String {
    format!("{:.2} €", amount)
}

/// One decimal, used for ratios
pub fn ratio(value: f64) -> String {
    format!("{:.1}", value)
}

pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// `-` for absent values
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// A `label: value` card line
pub fn card(label: &str, value: impl fmt::Display) -> String {
    format!("{:<22} {}", format!("{}:", label), value)
}
