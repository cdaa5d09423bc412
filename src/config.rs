//! [`Config`]-related definitions.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, ensure};
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Published listing feed.
const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/lma20255/my-site-portfolio/main/data/av.json";

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset source configuration.
    pub source: Source,

    /// HTTP client configuration.
    pub http: Http,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if it exists);
    /// - merging it with `LISTINGS__*` environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be deserialized.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("LISTINGS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Checks the values that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// Errors when no dataset location is set or the refresh interval is zero.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.source.path.is_some() || !self.source.url.trim().is_empty(),
            "source.url must be set when source.path is not"
        );
        ensure!(
            !self.source.refresh.is_zero(),
            "source.refresh must be greater than zero"
        );
        Ok(())
    }
}

/// Dataset source configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Source {
    /// URL of the JSON listing array.
    #[default(DEFAULT_SOURCE_URL.to_owned())]
    pub url: String,

    /// Local `.json`/`.csv`/`.parquet` file used instead of `url`.
    pub path: Option<PathBuf>,

    /// How long a fetched snapshot is served before refetching.
    #[default(Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub refresh: Duration,
}

/// HTTP client configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Http {
    /// `User-Agent` header sent with every request.
    #[default(concat!("rusty-listings/", env!("CARGO_PKG_VERSION")).to_owned())]
    pub user_agent: String,

    /// Whole-request timeout.
    #[default(Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}
