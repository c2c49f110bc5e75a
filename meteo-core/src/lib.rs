//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - A persistent place-name → coordinates cache
//! - Geocoding and forecast clients for the Open-Meteo APIs
//! - WMO weather code descriptions and temperature conversion
//! - The report produced for a place, ready for printing
//!
//! Nothing in here prints; the binary decides how to present results and errors.

pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
mod http;
pub mod model;
pub mod report;
pub mod service;
pub mod units;
pub mod wmo;

pub use cache::CacheStore;
pub use config::Config;
pub use error::{Stage, WeatherError};
pub use model::{
    Coordinates, CurrentConditions, GeoRecord, HourlyEntry, HourlySeries, ResolvedPlace,
};
pub use report::Report;
pub use service::WeatherService;
pub use units::TemperatureUnit;
pub use wmo::WeatherCode;
