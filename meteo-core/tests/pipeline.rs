//! End-to-end tests for the geocode → forecast pipeline against a mock
//! Open-Meteo server.

use std::time::Duration;

use meteo_core::{CacheStore, Config, Stage, TemperatureUnit, WeatherError, WeatherService};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seattle_geocode() -> serde_json::Value {
    json!({
        "results": [
            {"latitude": 47.6, "longitude": -122.3, "name": "Seattle", "country": "US"}
        ]
    })
}

fn config(server: &MockServer, dir: &TempDir) -> Config {
    Config::default()
        .with_base_url(&server.uri())
        .with_cache_path(dir.path().join("geo_cache.json"))
}

async fn mount_geocode(server: &MockServer, body: serde_json::Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, body: serde_json::Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fahrenheit_report() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;
    mount_forecast(&server, json!({"current": {"temperature_2m": 59.0, "weather_code": 1}}), 1).await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let report = service.report("Seattle", TemperatureUnit::Fahrenheit, false).await.unwrap();

    assert_eq!(report.headline(), "Seattle: 59.0°F, Mainly clear");
}

#[tokio::test]
async fn test_celsius_report() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;
    mount_forecast(&server, json!({"current": {"temperature_2m": 59.0, "weather_code": 1}}), 1).await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let report = service.report("Seattle", TemperatureUnit::Celsius, false).await.unwrap();

    assert_eq!(report.headline(), "Seattle: 15.0°C, Mainly clear");
}

#[tokio::test]
async fn test_case_and_whitespace_share_one_geocode_call() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let first = service.resolve("Seattle").await.unwrap();
    let second = service.resolve("  SEATTLE  ").await.unwrap();

    assert_eq!(first.coordinates, second.coordinates);
    assert_eq!(second.display_name, "SEATTLE");
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_qualified_query_searches_without_qualifier() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Los Angeles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"latitude": 34.05, "longitude": -118.24, "name": "Los Angeles", "country": "United States"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let place = service.resolve("Los Angeles, California").await.unwrap();

    assert_eq!(place.display_name, "Los Angeles, California");
    assert_eq!(place.resolved_name, "Los Angeles");
    assert_eq!(place.country, "United States");
    assert!(service.cache().get("los angeles, california").is_some());
    assert!(service.cache().get("los angeles").is_none());
}

#[tokio::test]
async fn test_cache_survives_across_runs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;

    let cfg = config(&server, &dir);
    WeatherService::new(&cfg).unwrap().resolve("Seattle").await.unwrap();

    let on_disk = CacheStore::load(&cfg.cache_path).unwrap();
    assert_eq!(on_disk.get("seattle").unwrap().resolved_name, "Seattle");

    // second process: served from the file, no new geocode request
    let place = WeatherService::new(&cfg).unwrap().resolve("seattle").await.unwrap();
    assert_eq!(place.coordinates.latitude, 47.6);
}

#[tokio::test]
async fn test_unknown_place_skips_forecast() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, json!({"results": []}), 1).await;
    mount_forecast(&server, json!({"current": {"temperature_2m": 59.0}}), 0).await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let err = service.report("Atlantis", TemperatureUnit::Fahrenheit, false).await.unwrap_err();

    assert!(matches!(err, WeatherError::PlaceNotFound(ref q) if q == "Atlantis"));
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_geocoding_http_error_is_network_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let err = service.resolve("Seattle").await.unwrap_err();

    match err {
        WeatherError::Network { stage, detail } => {
            assert_eq!(stage, Stage::Geocoding);
            assert!(detail.contains("503"), "{detail}");
        }
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_geocoder_times_out_without_retry() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(seattle_geocode())
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server, json!({"current": {"temperature_2m": 59.0}}), 0).await;

    let config = Config { timeout: Duration::from_millis(200), ..config(&server, &dir) };
    let mut service = WeatherService::new(&config).unwrap();
    let err = service.report("Seattle", TemperatureUnit::Fahrenheit, false).await.unwrap_err();

    match err {
        WeatherError::Network { stage, detail } => {
            assert_eq!(stage, Stage::Geocoding);
            assert!(detail.contains("timed out"), "{detail}");
        }
        other => panic!("expected network error, got {other:?}"),
    }
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_missing_temperature_is_incomplete() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;
    mount_forecast(&server, json!({"current": {"weather_code": 1, "relative_humidity_2m": 80}}), 1).await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let err = service.report("Seattle", TemperatureUnit::Fahrenheit, false).await.unwrap_err();

    assert!(matches!(err, WeatherError::IncompleteData(_)));
}

#[tokio::test]
async fn test_forecast_http_error_is_network_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let err = service.report("Seattle", TemperatureUnit::Fahrenheit, false).await.unwrap_err();

    assert!(matches!(err, WeatherError::Network { stage: Stage::Forecast, .. }));
}

#[tokio::test]
async fn test_hourly_window_is_clipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("hourly", "temperature_2m,precipitation_probability"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"time": "2024-05-01T02:30", "temperature_2m": 59.0, "weather_code": 61},
            "hourly": {
                "time": [
                    "2024-05-01T00:00",
                    "2024-05-01T01:00",
                    "2024-05-01T02:00",
                    "2024-05-01T03:00",
                    "2024-05-01T04:00"
                ],
                "temperature_2m": [55.0, 56.0, 57.0, 58.0, 59.5],
                "precipitation_probability": [0, 5, 10, 40, 80]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut service = WeatherService::new(&config(&server, &dir)).unwrap();
    let report = service.report("Seattle", TemperatureUnit::Fahrenheit, true).await.unwrap();

    assert_eq!(report.headline(), "Seattle: 59.0°F, Light rain");
    let labels: Vec<_> = report.outlook.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, ["03:00", "04:00"]);
    assert_eq!(report.outlook[1].precipitation_probability, Some(80));
}

#[tokio::test]
async fn test_configured_timezone_reaches_hourly_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("timezone", "Europe/Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"temperature_2m": 59.0},
            "hourly": {"time": ["2024-05-01T00:00"], "temperature_2m": [55.0]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config(&server, &dir).with_timezone("Europe/Berlin");
    let mut service = WeatherService::new(&cfg).unwrap();
    let report = service.report("Seattle", TemperatureUnit::Fahrenheit, true).await.unwrap();

    assert_eq!(report.headline(), "Seattle: 59.0°F, Unknown conditions");
}

#[tokio::test]
async fn test_corrupt_cache_is_set_aside() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_geocode(&server, seattle_geocode(), 1).await;

    let cfg = config(&server, &dir);
    std::fs::write(&cfg.cache_path, "{ definitely not json").unwrap();

    let mut service = WeatherService::new(&cfg).unwrap();
    service.resolve("Seattle").await.unwrap();

    assert!(dir.path().join("geo_cache.json.corrupt").exists());
    assert!(CacheStore::load(&cfg.cache_path).unwrap().get("seattle").is_some());
}
