use std::{io::IsTerminal, path::PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use meteo_core::{
    Config, TemperatureUnit, WeatherService,
    config::{DEFAULT_CACHE_FILE, DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL},
};
use tracing_subscriber::EnvFilter;

/// Looked up when no city is given.
pub const DEFAULT_CITY: &str = "Seattle";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Current weather for a place name")]
pub struct Cli {
    /// City name, e.g. `Seattle` or `Los Angeles, California`. Words are
    /// joined with spaces; anything after `#` is ignored.
    pub city: Vec<String>,

    /// Temperature unit, `c` or `f`. Asked interactively when omitted.
    #[arg(short, long)]
    pub unit: Option<TemperatureUnit>,

    /// Also show the next 12 hours.
    #[arg(long)]
    pub hourly: bool,

    /// Timezone for timestamps, e.g. `Europe/Berlin`; `auto` uses the place's own.
    #[arg(long, env = "METEO_TIMEZONE")]
    pub timezone: Option<String>,

    /// Coordinate cache file.
    #[arg(long, env = "METEO_CACHE_FILE", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    #[arg(long, env = "METEO_GEOCODING_URL", default_value = DEFAULT_GEOCODING_URL, hide = true)]
    pub geocoding_url: String,

    #[arg(long, env = "METEO_FORECAST_URL", default_value = DEFAULT_FORECAST_URL, hide = true)]
    pub forecast_url: String,

    /// More log output on stderr (-v info, -vv debug). `RUST_LOG` wins if set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let query = place_query(&self.city);
        let unit = match self.unit {
            Some(unit) => unit,
            None => prompt_unit()?,
        };

        let config = self.config();
        let mut service = WeatherService::new(&config)?;
        let report = service.report(&query, unit, self.hourly).await?;

        println!("{report}");
        Ok(())
    }

    fn config(&self) -> Config {
        let config = Config {
            geocoding_url: self.geocoding_url.clone(),
            forecast_url: self.forecast_url.clone(),
            ..Config::default()
        }
        .with_cache_path(&self.cache_file);

        match &self.timezone {
            Some(tz) => config.with_timezone(tz),
            None => config,
        }
    }
}

/// Join positional words into one query, drop a trailing `# comment`, and
/// fall back to [`DEFAULT_CITY`] when nothing is left.
pub fn place_query(words: &[String]) -> String {
    let raw = words.join(" ");
    let query = raw.split('#').next().unwrap_or_default().trim();

    if query.is_empty() { DEFAULT_CITY.to_string() } else { query.to_string() }
}

/// Ask for the unit on a terminal; anything but `c` means Fahrenheit.
fn prompt_unit() -> anyhow::Result<TemperatureUnit> {
    if !std::io::stdin().is_terminal() {
        return Ok(TemperatureUnit::default());
    }

    let answer = inquire::Text::new("Unit (c/f)?")
        .with_default("f")
        .prompt()
        .context("Failed to read temperature unit")?;

    Ok(answer.parse().unwrap_or_default())
}

pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "meteo=info,meteo_core=info",
        _ => "meteo=debug,meteo_core=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
