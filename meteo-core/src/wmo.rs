//! WMO weather interpretation codes as used by Open-Meteo.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

use std::fmt;

use serde_json::Value;

const TABLE: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Light rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Light snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (77, "Snow grains"),
    (80, "Light rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Light snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// Phrase for a known code, `None` otherwise.
pub fn lookup(code: i32) -> Option<&'static str> {
    TABLE.iter().find(|(c, _)| *c == code).map(|(_, text)| *text)
}

/// Human-readable condition. Codes outside the table still show the number.
pub fn describe(code: i32) -> String {
    match lookup(code) {
        Some(text) => text.to_string(),
        None => format!("Code {code}"),
    }
}

/// Weather code as reported by the provider, which may leave it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCode {
    Reported(i32),
    Unknown,
}

impl WeatherCode {
    /// Lenient parse of a raw JSON value: integers, fractional numbers
    /// (truncated) and numeric strings are accepted.
    pub fn from_json(value: Option<&Value>) -> Self {
        let code = match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64),
            _ => None,
        };

        code.and_then(|c| i32::try_from(c).ok())
            .map_or(WeatherCode::Unknown, WeatherCode::Reported)
    }

    pub fn describe(&self) -> String {
        match self {
            WeatherCode::Reported(code) => describe(*code),
            WeatherCode::Unknown => "Unknown conditions".to_string(),
        }
    }
}

impl fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
