// src/fetch/feed.rs

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::country::CountryMatch;
use crate::error::{DashboardError, Result};

/// GDACS event list endpoint.
pub const DEFAULT_FEED_URL: &str = "https://www.gdacs.org/gdacsapi/api/events/geteventlist/SEARCH";

/// Raw feed document: `{ "features": [ ... ] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fromdate: Option<String>,
}

/// Coordinates stay untyped: polygons nest arrays where points hold `[lon, lat]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Value,
}

impl Geometry {
    /// `(longitude, latitude)` for point geometries, `None` otherwise.
    pub fn point(&self) -> Option<(f64, f64)> {
        let coords = self.coordinates.as_array()?;
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some((lon, lat))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveEvent {
    pub name: String,
    pub start_date: String,
    pub country: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl LiveEvent {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

impl From<Feature> for LiveEvent {
    fn from(feature: Feature) -> Self {
        let point = feature.geometry.as_ref().and_then(Geometry::point);
        let props = feature.properties;
        LiveEvent {
            name: props.name.unwrap_or_default(),
            start_date: props.fromdate.unwrap_or_default(),
            country: props.country.unwrap_or_default(),
            longitude: point.map(|(lon, _)| lon),
            latitude: point.map(|(_, lat)| lat),
        }
    }
}

/// Result of one live fetch. A failed fetch yields no events and a warning.
#[derive(Debug, Clone, Default)]
pub struct LiveFeed {
    pub events: Vec<LiveEvent>,
    pub warning: Option<String>,
}

impl LiveFeed {
    pub fn with_coordinates(&self) -> impl Iterator<Item = &LiveEvent> {
        self.events.iter().filter(|e| e.coordinates().is_some())
    }
}

/// Where the live feed lives and which country we care about.
#[derive(Debug, Clone)]
pub struct FeedSource<'a> {
    pub url: &'a str,
    pub country: &'a str,
    pub country_match: CountryMatch,
}

/// Single GET of the feed document. No retry.
pub fn fetch_feed(client: &Client, url: &str) -> Result<FeedDocument> {
    let failed = |reason: String| DashboardError::RemoteFetchFailed {
        url: url.to_string(),
        reason,
    };

    debug!("fetching live feed from {}", url);
    let body = client
        .get(url)
        .send()
        .map_err(|e| failed(format!("GET failed: {}", e)))?
        .error_for_status()
        .map_err(|e| failed(format!("non-success status: {}", e)))?
        .text()
        .map_err(|e| failed(format!("reading body: {}", e)))?;

    serde_json::from_str(&body).map_err(|e| failed(format!("parsing feed JSON: {}", e)))
}

/// Keep only features whose declared country matches `country`.
pub fn filter_by_country(
    doc: FeedDocument,
    country: &str,
    country_match: CountryMatch,
) -> Vec<LiveEvent> {
    doc.features
        .into_iter()
        .filter(|f| {
            f.properties
                .country
                .as_deref()
                .is_some_and(|declared| country_match.matches(declared, country))
        })
        .map(LiveEvent::from)
        .collect()
}

/// Fetch and narrow the live feed. Never fails: errors become `LiveFeed::warning`.
#[instrument(level = "info", skip(client, source), fields(url = source.url, country = source.country))]
pub fn fetch_live_events(client: &Client, source: &FeedSource<'_>) -> LiveFeed {
    match fetch_feed(client, source.url) {
        Ok(doc) => {
            let total = doc.features.len();
            let events = filter_by_country(doc, source.country, source.country_match);
            info!(total, kept = events.len(), "live feed fetched");
            LiveFeed {
                events,
                warning: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "live feed unavailable, continuing without it");
            LiveFeed {
                events: Vec::new(),
                warning: Some(format!("Failed to fetch live disaster data: {}", e)),
            }
        }
    }
}
