// src/dataset/mod.rs

pub mod cache;
pub mod clean;

use std::{fs::File, io::Read, path::Path};

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{DashboardError, Result};

pub use cache::{DatasetCache, SourceKey};
pub use clean::{clean_date_text, extract_duration, parse_date, DATE_FORMAT};

/// Which source columns feed the normalized schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub duration: String,
    pub category: String,
    pub title: Option<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            duration: "Duration".to_string(),
            category: "Disaster_Info".to_string(),
            title: Some("Title".to_string()),
        }
    }
}

/// A normalized row. `date` is always valid; rows that failed to parse never get here.
#[derive(Debug, Clone, PartialEq)]
pub struct DisasterRecord {
    pub date: NaiveDate,
    pub duration: Option<u32>,
    pub category_label: String,
    pub title: Option<String>,
    /// Every source cell, aligned with `Dataset::headers`.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<DisasterRecord>,
    /// Rows discarded because their date did not parse.
    pub dropped_rows: usize,
    /// Positions of the date and duration columns within `headers`.
    pub date_column: usize,
    pub duration_column: usize,
}

impl Dataset {
    /// Earliest and latest record date, if any records survived.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn column_index(headers: &[String], name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DashboardError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

/// Load and normalize the CSV at `path`. Any read failure is fatal.
#[instrument(level = "info", skip(path, columns), fields(path = %path.display()))]
pub fn load_dataset(path: &Path, columns: &ColumnNames) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| DashboardError::SourceUnreadable {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let dataset = read_dataset(file, path, columns)?;
    info!(
        records = dataset.records.len(),
        dropped = dataset.dropped_rows,
        "dataset normalized"
    );
    Ok(dataset)
}

/// Normalize CSV text from any reader; `origin` is only used in error messages.
pub fn read_dataset<R: Read>(reader: R, origin: &Path, columns: &ColumnNames) -> Result<Dataset> {
    let unreadable = |source: csv::Error| DashboardError::SourceUnreadable {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(unreadable)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let date_idx = column_index(&headers, &columns.date, origin)?;
    let duration_idx = column_index(&headers, &columns.duration, origin)?;
    let category_idx = column_index(&headers, &columns.category, origin)?;
    // the title column is optional; a dataset without it just has no titles
    let title_idx = columns
        .title
        .as_deref()
        .and_then(|name| headers.iter().position(|h| h.trim() == name));

    let mut records = Vec::new();
    let mut dropped_rows = 0;

    for (line, result) in rdr.records().enumerate() {
        let row = result.map_err(unreadable)?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let date = match parse_date(cell(date_idx)) {
            Some(d) => d,
            None => {
                debug!(line = line + 2, raw = cell(date_idx), "dropping row with bad date");
                dropped_rows += 1;
                continue;
            }
        };

        records.push(DisasterRecord {
            date,
            duration: extract_duration(cell(duration_idx)),
            category_label: cell(category_idx).to_string(),
            title: title_idx.map(|i| cell(i).to_string()),
            fields: row.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(Dataset {
        headers,
        records,
        dropped_rows,
        date_column: date_idx,
        duration_column: duration_idx,
    })
}
