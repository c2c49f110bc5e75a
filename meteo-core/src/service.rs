use tracing::debug;

use crate::{
    cache::CacheStore,
    config::Config,
    error::Result,
    forecast::{ForecastClient, current_hour_index, report_window},
    geocode::Geocoder,
    model::ResolvedPlace,
    report::Report,
    units::TemperatureUnit,
};

/// Place name in, report out: geocode (cache first), then forecast.
/// Calls run strictly one after another; a failed geocode means no forecast
/// request is made.
#[derive(Debug)]
pub struct WeatherService {
    geocoder: Geocoder,
    forecast: ForecastClient,
    cache: CacheStore,
}

impl WeatherService {
    /// Build the clients and load the coordinate cache from
    /// `config.cache_path`, recovering from a corrupt file.
    pub fn new(config: &Config) -> Result<Self> {
        let cache = CacheStore::load_or_recover(config.cache_path.clone())?;
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: &Config, cache: CacheStore) -> Result<Self> {
        debug!(path = %cache.path().display(), entries = cache.len(), "coordinate cache ready");
        Ok(Self {
            geocoder: Geocoder::new(config)?,
            forecast: ForecastClient::new(config)?,
            cache,
        })
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub async fn resolve(&mut self, query: &str) -> Result<ResolvedPlace> {
        self.geocoder.resolve(&mut self.cache, query).await
    }

    /// Current conditions for `query`, plus the hourly outlook when `hourly` is set.
    pub async fn report(
        &mut self,
        query: &str,
        unit: TemperatureUnit,
        hourly: bool,
    ) -> Result<Report> {
        let place = self.resolve(query).await?;

        if !hourly {
            let current = self.forecast.fetch_current(place.coordinates).await?;
            return Ok(Report::new(&place, &current, unit));
        }

        let (current, series) = self.forecast.fetch_hourly(place.coordinates).await?;
        let index = current_hour_index(current.observed_at.as_deref(), &series.timestamps);
        let window = report_window(&series, index);
        debug!(index, hours = window.len(), "hourly outlook window");

        Ok(Report::new(&place, &current, unit).with_outlook(&window))
    }
}
