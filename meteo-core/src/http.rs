use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, Stage, WeatherError};

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

/// Client with a fixed per-request timeout. Requests are never retried.
pub fn build_client(stage: Stage, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherError::network(stage, format!("failed to build HTTP client: {e}")))
}

/// GET `url` with `query` and decode the JSON body. Transport errors,
/// timeouts, non-2xx statuses and undecodable bodies all become
/// [`WeatherError::Network`] tagged with `stage`.
pub async fn get_json<T: DeserializeOwned>(
    http: &Client,
    stage: Stage,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    debug!(%stage, url, ?query, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| WeatherError::network(stage, describe_transport_error(&e)))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| WeatherError::network(stage, format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(WeatherError::network(
            stage,
            format!("request failed with status {}: {}", status, truncate_body(&body)),
        ));
    }

    serde_json::from_str(&body)
        .map_err(|e| WeatherError::network(stage, format!("failed to parse response JSON: {e}")))
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
