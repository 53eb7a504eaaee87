pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod metrics;
pub mod notify;
pub mod views;

pub use config::Config;
pub use dashboard::{Dashboard, Snapshot};
pub use dataset::{Dataset, DatasetCache, DisasterRecord};
pub use error::{DashboardError, Result};
pub use fetch::{CountryMatch, LiveEvent, LiveFeed};
pub use filter::{Category, FilterCriteria};
pub use metrics::Metrics;
