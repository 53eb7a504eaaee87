// src/fetch/mod.rs

pub mod country;
pub mod feed;

use reqwest::blocking::Client;

use crate::error::{DashboardError, Result};

pub use country::CountryMatch;
pub use feed::{
    fetch_feed, fetch_live_events, filter_by_country, FeedDocument, FeedSource, LiveEvent,
    LiveFeed, DEFAULT_FEED_URL,
};

/// Blocking HTTP client shared by the live feed and the SMS channel.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("disasterwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(DashboardError::HttpClient)
}
