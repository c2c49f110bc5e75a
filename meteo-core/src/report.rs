use std::fmt;

use chrono::{Local, NaiveDateTime};

use crate::{
    model::{CurrentConditions, HourlyEntry, ResolvedPlace},
    units::TemperatureUnit,
};

/// Everything needed to print a report, already converted to the display unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub place: String,
    pub unit: TemperatureUnit,
    pub temperature: f64,
    pub condition: String,
    pub humidity_pct: Option<u8>,
    pub wind_mph: Option<f64>,
    pub as_of: String,
    pub outlook: Vec<OutlookLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlookLine {
    pub label: String,
    pub temperature: f64,
    pub precipitation_probability: Option<u8>,
}

impl Report {
    pub fn new(place: &ResolvedPlace, current: &CurrentConditions, unit: TemperatureUnit) -> Self {
        let as_of = current
            .observed_at
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M %:z").to_string());

        Self {
            place: place.display_name.clone(),
            unit,
            temperature: unit.convert_fahrenheit(current.temperature_f),
            condition: current.weather_code.describe(),
            humidity_pct: current.humidity_pct,
            wind_mph: current.wind_mph,
            as_of,
            outlook: Vec::new(),
        }
    }

    pub fn with_outlook(mut self, entries: &[HourlyEntry]) -> Self {
        let unit = self.unit;
        self.outlook = entries
            .iter()
            .map(|e| OutlookLine {
                label: hour_label(&e.timestamp),
                temperature: unit.convert_fahrenheit(e.temperature_f),
                precipitation_probability: e.precipitation_probability,
            })
            .collect();
        self
    }

    /// `Seattle: 59.0°F, Mainly clear`
    pub fn headline(&self) -> String {
        format!("{}: {:.1}{}, {}", self.place, self.temperature, self.unit.symbol(), self.condition)
    }

    fn details(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.humidity_pct.map(|h| format!("Humidity {h}%")),
            self.wind_mph.map(|w| format!("wind {w:.1} mph")),
        ]
        .into_iter()
        .flatten()
        .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

fn hour_label(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline())?;
        if let Some(details) = self.details() {
            writeln!(f, "{details}")?;
        }
        write!(f, "As of {}", self.as_of)?;

        if !self.outlook.is_empty() {
            write!(f, "\n\nNext {} hours:", self.outlook.len())?;
            for line in &self.outlook {
                let pop = match line.precipitation_probability {
                    Some(p) => format!("{p}%"),
                    None => "--".to_string(),
                };
                write!(
                    f,
                    "\n  {}  {:>6.1}{}  precip {}",
                    line.label,
                    line.temperature,
                    self.unit.symbol(),
                    pop
                )?;
            }
        }

        Ok(())
    }
}
