use std::{path::PathBuf, time::Duration};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_CACHE_FILE: &str = "geo_cache.json";
pub const DEFAULT_TIMEZONE: &str = "auto";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime settings. There is no config file; the CLI fills this from flags
/// and environment variables on top of [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Coordinate cache artifact, relative to the working directory by default.
    pub cache_path: PathBuf,
    /// Passed through to the forecast provider; "auto" resolves from coordinates.
    pub timezone: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Point both endpoints at one base URL, e.g. a local mock server.
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.geocoding_url = format!("{base}/v1/search");
        self.forecast_url = format!("{base}/v1/forecast");
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// Blank values keep the current timezone.
    pub fn with_timezone(mut self, timezone: &str) -> Self {
        let timezone = timezone.trim();
        if !timezone.is_empty() {
            self.timezone = timezone.to_string();
        }
        self
    }
}
