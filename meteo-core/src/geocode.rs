//! Forward geocoding through the Open-Meteo geocoding API, memoized in the
//! coordinate cache.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    cache::{CacheStore, normalize_key},
    config::Config,
    error::{Result, Stage, WeatherError},
    http::{build_client, get_json},
    model::{GeoRecord, ResolvedPlace},
};

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    results: Option<Vec<GeoSearchResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoSearchResult {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country: Option<String>,
}

impl From<GeoSearchResult> for GeoRecord {
    fn from(r: GeoSearchResult) -> Self {
        GeoRecord {
            latitude: r.latitude,
            longitude: r.longitude,
            resolved_name: r.name,
            country: r.country.unwrap_or_default(),
        }
    }
}

/// Text sent to the provider: everything before the first comma, so
/// "Los Angeles, California" searches for "Los Angeles".
pub fn search_name(query: &str) -> &str {
    query.split(',').next().unwrap_or_default().trim()
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: Client,
    url: String,
}

impl Geocoder {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: build_client(Stage::Geocoding, config.timeout)?,
            url: config.geocoding_url.clone(),
        })
    }

    /// Best match for `name`, or `None` when the provider knows no such place.
    pub async fn search(&self, name: &str) -> Result<Option<GeoRecord>> {
        let query = [("name", name.to_string()), ("count", "1".to_string())];
        let parsed: GeoSearchResponse =
            get_json(&self.http, Stage::Geocoding, &self.url, &query).await?;

        Ok(parsed.results.and_then(|results| results.into_iter().next()).map(GeoRecord::from))
    }

    /// Resolve a free-form place query to coordinates, consulting `cache`
    /// first. A miss is geocoded, stored and persisted right away.
    pub async fn resolve(&self, cache: &mut CacheStore, query: &str) -> Result<ResolvedPlace> {
        let key = normalize_key(query);

        let record = match cache.get(&key) {
            Some(record) => {
                debug!(%key, "coordinate cache hit");
                record.clone()
            }
            None => {
                let name = search_name(query);
                if name.is_empty() {
                    return Err(WeatherError::PlaceNotFound(query.to_string()));
                }

                debug!(%key, name, "coordinate cache miss; geocoding");
                let record = self
                    .search(name)
                    .await?
                    .ok_or_else(|| WeatherError::PlaceNotFound(query.to_string()))?;

                info!(
                    name = %record.resolved_name,
                    lat = record.latitude,
                    lon = record.longitude,
                    "geocoded"
                );

                cache.put(&key, record.clone());
                cache.persist()?;
                record
            }
        };

        let display_name = match query.trim() {
            "" => record.resolved_name.clone(),
            q => q.to_string(),
        };

        Ok(ResolvedPlace {
            coordinates: record.coordinates(),
            display_name,
            resolved_name: record.resolved_name,
            country: record.country,
        })
    }
}
