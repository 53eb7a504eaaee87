// src/dashboard.rs

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::{info, instrument};

use crate::{
    config::Config,
    dataset::{Dataset, DatasetCache, DisasterRecord},
    error::Result,
    fetch::{fetch_live_events, FeedSource, LiveFeed},
    filter::{Category, FilterCriteria},
    metrics::Metrics,
};

/// Everything one render pass produces.
#[derive(Debug)]
pub struct Snapshot {
    pub dataset: Arc<Dataset>,
    pub criteria: FilterCriteria,
    pub filtered: Vec<DisasterRecord>,
    pub metrics: Metrics,
    /// `None` when the pass skipped the live feed.
    pub live: Option<LiveFeed>,
}

pub struct Dashboard {
    config: Config,
    cache: DatasetCache,
    client: Client,
}

impl Dashboard {
    pub fn new(config: Config, client: Client) -> Self {
        let cache = DatasetCache::new(config.dataset.columns.clone());
        Self {
            config,
            cache,
            client,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Normalized dataset, memoized until the source file changes.
    pub fn dataset(&self) -> Result<Arc<Dataset>> {
        self.cache.get_or_load(&self.config.dataset.path)
    }

    /// Force the next pass to re-read the source.
    pub fn reload(&self) {
        self.cache.invalidate();
    }

    /// Full date span of the dataset with every category.
    pub fn default_criteria(dataset: &Dataset) -> FilterCriteria {
        let (start, end) = dataset
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterCriteria::new(start, end, Category::All)
    }

    /// Fill unset bounds from the dataset's own span.
    pub fn criteria(
        dataset: &Dataset,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        category: Category,
    ) -> FilterCriteria {
        let defaults = Self::default_criteria(dataset);
        FilterCriteria::new(
            start.unwrap_or(defaults.start_date),
            end.unwrap_or(defaults.end_date),
            category,
        )
    }

    pub fn live_feed(&self) -> LiveFeed {
        let source = FeedSource {
            url: &self.config.feed.url,
            country: &self.config.feed.country,
            country_match: self.config.feed.country_match,
        };
        fetch_live_events(&self.client, &source)
    }

    /// One recomputation: cached dataset → filter → metrics, plus a fresh live fetch.
    #[instrument(level = "info", skip(self))]
    pub fn render_pass(&self, criteria: &FilterCriteria, include_live: bool) -> Result<Snapshot> {
        let dataset = self.dataset()?;
        let filtered = criteria.apply(&dataset.records);
        let metrics = Metrics::compute(&filtered);
        info!(
            total = dataset.records.len(),
            filtered = filtered.len(),
            "render pass filtered dataset"
        );

        let live = include_live.then(|| self.live_feed());

        Ok(Snapshot {
            dataset,
            criteria: criteria.clone(),
            filtered,
            metrics,
            live,
        })
    }
}
