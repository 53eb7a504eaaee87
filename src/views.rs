//! Data behind the dashboard's charts and map: frequency series, category
//! distribution and map markers. Rendering itself lives in the CLI.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{dataset::DisasterRecord, fetch::LiveEvent};

/// Where the map is centred when the dashboard opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl Default for MapCenter {
    fn default() -> Self {
        // India
        Self {
            latitude: 20.5937,
            longitude: 78.9629,
            zoom: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
}

/// Records per calendar day from the first to the last date, zero-filled.
pub fn daily_frequency(records: &[DisasterRecord]) -> Vec<(NaiveDate, usize)> {
    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) else {
        return Vec::new();
    };

    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.date).or_default() += 1;
    }

    let mut out = Vec::new();
    let mut day = first;
    while day <= last {
        out.push((day, counts.get(&day).copied().unwrap_or(0)));
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

/// Count per exact category label, most frequent first, ties by label.
pub fn category_distribution(records: &[DisasterRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.category_label.as_str()).or_default() += 1;
    }

    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Markers for live events that carry coordinates; the rest are skipped.
pub fn map_points<'a>(events: impl IntoIterator<Item = &'a LiveEvent>) -> Vec<MapPoint> {
    events
        .into_iter()
        .filter_map(|e| {
            let (latitude, longitude) = e.coordinates()?;
            Some(MapPoint {
                latitude,
                longitude,
                popup: format!("{} - {}", e.name, e.start_date),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, label: &str) -> DisasterRecord {
        DisasterRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            duration: None,
            category_label: label.to_string(),
            title: None,
            fields: Vec::new(),
        }
    }

    #[test]
    fn frequency_fills_gaps_with_zero() {
        let records = vec![
            record("2020-01-03", "Flood"),
            record("2020-01-01", "Flood"),
            record("2020-01-03", "Cyclone"),
        ];
        let series: Vec<usize> = daily_frequency(&records).into_iter().map(|(_, n)| n).collect();
        assert_eq!(series, [1, 0, 2]);
        assert!(daily_frequency(&[]).is_empty());
    }

    #[test]
    fn distribution_sorted_by_count() {
        let records = vec![
            record("2020-01-01", "Flood"),
            record("2020-01-02", "Cyclone"),
            record("2020-01-03", "Flood"),
            record("2020-01-04", "Avalanche"),
        ];
        assert_eq!(
            category_distribution(&records),
            vec![
                ("Flood".to_string(), 2),
                ("Avalanche".to_string(), 1),
                ("Cyclone".to_string(), 1),
            ]
        );
    }

    #[test]
    fn map_skips_events_without_coordinates() {
        let events = vec![
            LiveEvent {
                name: "Flood".into(),
                start_date: "2024-06-01".into(),
                country: "India".into(),
                longitude: Some(92.9),
                latitude: Some(26.2),
            },
            LiveEvent {
                name: "Heat".into(),
                start_date: "2024-06-02".into(),
                country: "India".into(),
                longitude: None,
                latitude: None,
            },
        ];
        let points = map_points(&events);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].popup, "Flood - 2024-06-01");
        assert_eq!((points[0].latitude, points[0].longitude), (26.2, 92.9));
    }
}
