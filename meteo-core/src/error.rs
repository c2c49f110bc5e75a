use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Which remote call a network failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocoding,
    Forecast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geocoding => "geocoding",
            Stage::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every terminal failure the core can report. None of them are retried.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Could not geocode city: {0}")]
    PlaceNotFound(String),

    #[error("Network error ({stage}): {detail}")]
    Network { stage: Stage, detail: String },

    #[error("Incomplete weather data: {0}")]
    IncompleteData(String),

    #[error("Coordinate cache {} is corrupt", .path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    pub(crate) fn network(stage: Stage, detail: impl fmt::Display) -> Self {
        Self::Network { stage, detail: detail.to_string() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
