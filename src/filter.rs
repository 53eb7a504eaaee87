use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use crate::dataset::DisasterRecord;

/// Category choices offered by the dashboard sidebar.
pub const CATEGORY_CHOICES: &[&str] = &["All", "Earthquake", "Flood", "Cyclone", "Wildfire"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    All,
    /// Case-insensitive substring of `category_label`.
    Label(String),
}

impl Category {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Category::All => true,
            Category::Label(needle) => label.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Category::All)
        } else {
            Ok(Category::Label(s.to_string()))
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::All => f.write_str("All"),
            Category::Label(label) => f.write_str(label),
        }
    }
}

/// Built fresh from user input on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: Category,
}

impl FilterCriteria {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, category: Category) -> Self {
        Self {
            start_date,
            end_date,
            category,
        }
    }

    pub fn matches(&self, record: &DisasterRecord) -> bool {
        self.start_date <= record.date
            && record.date <= self.end_date
            && self.category.matches(&record.category_label)
    }

    /// Working subset in source order. An inverted range is simply empty.
    pub fn apply(&self, records: &[DisasterRecord]) -> Vec<DisasterRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
