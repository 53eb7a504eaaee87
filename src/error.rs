// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::notify::Channel;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("dataset {path:?} is unreadable: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {path:?} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("building HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("live feed {url} failed: {reason}")]
    RemoteFetchFailed { url: String, reason: String },

    #[error("{channel} notification failed: {reason}")]
    NotificationFailed { channel: Channel, reason: String },

    #[error("{channel} destination {destination:?} is not valid")]
    InvalidDestination {
        channel: Channel,
        destination: String,
    },

    #[error("no phone number or email address was given")]
    NoContact,

    #[error("writing export {path:?}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("config file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    /// Fatal errors abort the render pass; everything else is reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DashboardError::SourceUnreadable { .. }
                | DashboardError::MissingColumn { .. }
                | DashboardError::ConfigFile { .. }
                | DashboardError::Config(_)
                | DashboardError::HttpClient(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
