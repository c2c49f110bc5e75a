//! Open-Meteo forecast client.
//!
//! Temperatures are always requested in Fahrenheit; conversion happens
//! locally. Optional fields degrade to `None`, a missing temperature does not.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::Config,
    error::{Result, Stage, WeatherError},
    http::{build_client, get_json},
    model::{Coordinates, CurrentConditions, HourlyEntry, HourlySeries},
    wmo::WeatherCode,
};

const CURRENT_FIELDS: &str = "temperature_2m,weather_code,relative_humidity_2m,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability";

/// How many hours the outlook shows after the current one.
pub const OUTLOOK_HOURS: usize = 12;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: Option<CurrentBlock>,
    /// Older API shape, still served by some deployments.
    #[serde(default)]
    current_weather: Option<CurrentBlock>,
    #[serde(default)]
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    #[serde(default, alias = "temperature")]
    temperature_2m: Option<f64>,
    #[serde(default, alias = "weathercode")]
    weather_code: Option<Value>,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default, alias = "windspeed")]
    wind_speed_10m: Option<f64>,
    #[serde(default)]
    time: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Option<Vec<String>>,
    #[serde(default)]
    temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    precipitation_probability: Option<Vec<Option<f64>>>,
}

impl ForecastResponse {
    fn into_current(self) -> Result<(CurrentConditions, Option<HourlyBlock>)> {
        let block = self.current.or(self.current_weather).ok_or_else(|| {
            WeatherError::IncompleteData("response has no current conditions".into())
        })?;

        let temperature_f = block
            .temperature_2m
            .ok_or_else(|| WeatherError::IncompleteData("current temperature is missing".into()))?;

        let current = CurrentConditions {
            temperature_f,
            weather_code: WeatherCode::from_json(block.weather_code.as_ref()),
            humidity_pct: block.relative_humidity_2m.map(to_percent),
            wind_mph: block.wind_speed_10m,
            observed_at: block.time.as_ref().and_then(Value::as_str).map(str::to_string),
        };

        Ok((current, self.hourly))
    }
}

impl HourlyBlock {
    /// Entries with a null temperature are dropped; sequences of unequal
    /// length are cut to the shortest.
    fn into_series(self) -> Result<HourlySeries> {
        let times = self
            .time
            .ok_or_else(|| WeatherError::IncompleteData("hourly timestamps are missing".into()))?;
        let temps = self
            .temperature_2m
            .ok_or_else(|| WeatherError::IncompleteData("hourly temperatures are missing".into()))?;
        let mut pops = self.precipitation_probability.unwrap_or_default().into_iter();

        let mut series = HourlySeries::default();
        for (timestamp, temperature) in times.into_iter().zip(temps) {
            let pop = pops.next().flatten().map(to_percent);
            if let Some(temperature_f) = temperature {
                series.timestamps.push(timestamp);
                series.temperatures_f.push(temperature_f);
                series.precipitation_probabilities.push(pop);
            }
        }

        Ok(series)
    }
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Index of the hour containing `observed_at`, matched on the `YYYY-MM-DDTHH`
/// prefix. Falls back to 0 when there is no observation time or no match.
pub fn current_hour_index(observed_at: Option<&str>, timestamps: &[String]) -> usize {
    let Some(observed) = observed_at else {
        return 0;
    };
    let hour = observed.get(..13).unwrap_or(observed);

    timestamps.iter().position(|t| t.starts_with(hour)).unwrap_or(0)
}

/// Up to [`OUTLOOK_HOURS`] entries strictly after `index`, clipped to the end
/// of the series.
pub fn report_window(series: &HourlySeries, index: usize) -> Vec<HourlyEntry> {
    (index.saturating_add(1)..series.len())
        .take(OUTLOOK_HOURS)
        .filter_map(|i| series.entry(i))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Client,
    url: String,
    timezone: String,
}

impl ForecastClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: build_client(Stage::Forecast, config.timeout)?,
            url: config.forecast_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    pub async fn fetch_current(&self, coords: Coordinates) -> Result<CurrentConditions> {
        let (current, _) = self.request(coords, false).await?.into_current()?;
        Ok(current)
    }

    /// Current conditions plus the hourly temperature / precipitation series.
    pub async fn fetch_hourly(
        &self,
        coords: Coordinates,
    ) -> Result<(CurrentConditions, HourlySeries)> {
        let (current, hourly) = self.request(coords, true).await?.into_current()?;
        let series = hourly
            .ok_or_else(|| WeatherError::IncompleteData("hourly forecast is missing".into()))?
            .into_series()?;

        Ok((current, series))
    }

    async fn request(&self, coords: Coordinates, hourly: bool) -> Result<ForecastResponse> {
        let mut query = vec![
            ("latitude", coords.latitude.to_string()),
            ("longitude", coords.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("timezone", self.timezone.clone()),
        ];
        if hourly {
            query.push(("hourly", HOURLY_FIELDS.to_string()));
        }

        debug!(lat = coords.latitude, lon = coords.longitude, hourly, "fetching forecast");
        get_json(&self.http, Stage::Forecast, &self.url, &query).await
    }
}
