// src/config.rs
// Configuration: defaults, optional YAML file, then environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    dataset::ColumnNames,
    error::{DashboardError, Result},
    fetch::{CountryMatch, DEFAULT_FEED_URL},
    notify::{sms::DEFAULT_TWILIO_API_BASE, SmtpConfig, TwilioConfig},
    views::MapCenter,
};

fn default_dataset_path() -> PathBuf {
    PathBuf::from("Natural_Disasters_in_India.csv")
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_country() -> String {
    "India".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub columns: ColumnNames,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            columns: ColumnNames::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub country_match: CountryMatch,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            country: default_country(),
            country_match: CountryMatch::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub twilio: Option<TwilioConfig>,
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub map_center: MapCenter,
}

impl Config {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml(&text, path)
    }

    pub fn from_yaml(text: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| DashboardError::ConfigFile {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Override from environment variables. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("DISASTERWATCH_DATASET") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(url) = get("DISASTERWATCH_FEED_URL") {
            self.feed.url = url;
        }
        if let Some(country) = get("DISASTERWATCH_COUNTRY") {
            self.feed.country = country;
        }
        if let Some(mode) = get("DISASTERWATCH_COUNTRY_MATCH") {
            self.feed.country_match = mode.parse().map_err(DashboardError::Config)?;
        }

        if let (Some(account_sid), Some(auth_token), Some(from_number)) = (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_PHONE_NUMBER"),
        ) {
            debug!("Twilio credentials taken from environment");
            self.notify.twilio = Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
            });
        }

        if let (Some(server), Some(username), Some(password)) = (
            get("SMTP_SERVER"),
            get("SMTP_USERNAME"),
            get("SMTP_PASSWORD"),
        ) {
            let port = match get("SMTP_PORT") {
                Some(p) => p
                    .trim()
                    .parse()
                    .map_err(|_| DashboardError::Config(format!("SMTP_PORT `{}` is not a port", p)))?,
                None => 587,
            };
            debug!("SMTP credentials taken from environment");
            self.notify.smtp = Some(SmtpConfig {
                server,
                port,
                username,
                password,
            });
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.feed.url)
            .map_err(|e| DashboardError::Config(format!("feed url `{}`: {}", self.feed.url, e)))?;
        if self.feed.country.trim().is_empty() {
            return Err(DashboardError::Config("feed country is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_india() {
        let config = Config::default();
        assert_eq!(config.feed.country, "India");
        assert_eq!(config.feed.country_match, CountryMatch::Exact);
        assert_eq!(config.dataset.columns.date, "Date");
        assert!(config.notify.twilio.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = r#"
dataset:
  path: /data/disasters.csv
  columns:
    category: Type
feed:
  country: Nepal
  country_match: ignore-case
notify:
  smtp:
    server: smtp.example.com
    username: alerts@example.com
    password: pw
"#;
        let config = Config::from_yaml(yaml, Path::new("config.yaml")).unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("/data/disasters.csv"));
        assert_eq!(config.dataset.columns.category, "Type");
        assert_eq!(config.dataset.columns.date, "Date");
        assert_eq!(config.feed.country, "Nepal");
        assert_eq!(config.feed.country_match, CountryMatch::IgnoreCase);
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.notify.smtp.unwrap().port, 587);
    }

    #[test]
    fn bad_yaml_is_config_error() {
        let err = Config::from_yaml("feed: [", Path::new("bad.yaml")).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigFile { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn environment_supplies_credentials() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("DISASTERWATCH_DATASET", "other.csv"),
                ("TWILIO_ACCOUNT_SID", "AC1"),
                ("TWILIO_AUTH_TOKEN", "tok"),
                ("TWILIO_PHONE_NUMBER", "+15005550006"),
                ("SMTP_SERVER", "smtp.example.com"),
                ("SMTP_PORT", "2525"),
                ("SMTP_USERNAME", "me@example.com"),
                ("SMTP_PASSWORD", "pw"),
            ]))
            .unwrap();

        assert_eq!(config.dataset.path, PathBuf::from("other.csv"));
        let twilio = config.notify.twilio.unwrap();
        assert_eq!(twilio.api_base, DEFAULT_TWILIO_API_BASE);
        assert_eq!(config.notify.smtp.unwrap().port, 2525);
    }

    #[test]
    fn partial_credentials_are_ignored() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("TWILIO_ACCOUNT_SID", "AC1"), ("SMTP_SERVER", "smtp")]))
            .unwrap();
        assert!(config.notify.twilio.is_none());
        assert!(config.notify.smtp.is_none());
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[
                ("SMTP_SERVER", "smtp"),
                ("SMTP_USERNAME", "u@example.com"),
                ("SMTP_PASSWORD", "pw"),
                ("SMTP_PORT", "lots"),
            ]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));

        let mut config = Config::default();
        config.feed.url = "not a url".into();
        assert!(config.validate().is_err());
    }
}
