use chrono::NaiveDate;
use serde::Serialize;

use crate::dataset::{DisasterRecord, DATE_FORMAT};

/// Summary statistics over the filtered subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total_count: usize,
    /// `None` for an empty subset; callers print a placeholder.
    pub most_recent_date: Option<NaiveDate>,
    pub max_duration: Option<u32>,
    pub avg_duration: Option<f64>,
}

impl Metrics {
    pub fn compute(records: &[DisasterRecord]) -> Self {
        let durations: Vec<u32> = records.iter().filter_map(|r| r.duration).collect();
        let avg_duration = if durations.is_empty() {
            None
        } else {
            let sum: u64 = durations.iter().map(|&d| u64::from(d)).sum();
            Some(sum as f64 / durations.len() as f64)
        };

        Metrics {
            total_count: records.len(),
            most_recent_date: records.iter().map(|r| r.date).max(),
            max_duration: durations.iter().copied().max(),
            avg_duration,
        }
    }

    pub fn most_recent_display(&self) -> Option<String> {
        self.most_recent_date.map(|d| d.format(DATE_FORMAT).to_string())
    }

    /// Mean duration with two decimals, e.g. `5.00`.
    pub fn avg_duration_display(&self) -> Option<String> {
        self.avg_duration.map(|avg| format!("{:.2}", avg))
    }
}
