use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One geocoding match returned by `/geo/1.0/direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Suggestion {
    /// Name stored as the query once the suggestion is resolved, e.g. `Paris,FR`.
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) => format!("{},{}, {}", self.name, self.country, state),
            None => format!("{},{}", self.name, self.country),
        }
    }

    /// Row text shown in the autocomplete dropdown.
    pub fn label(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, self.country, state),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// What a weather fetch resolves: a free-text city or a picked suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

/// Raw current-weather payload from `/data/2.5/weather` (metric units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub name: String,
    pub weather: Vec<ConditionEntry>,
    pub main: MainReadings,
    pub wind: Wind,
    /// Meters; OpenWeather omits it for some stations.
    #[serde(default)]
    pub visibility: Option<u32>,
    pub sys: SunTimes,
    /// Shift in seconds from UTC for the location.
    #[serde(default)]
    pub timezone: i32,
}

impl WeatherPayload {
    pub fn primary_condition(&self) -> Option<&ConditionEntry> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl ConditionEntry {
    /// OpenWeather's rendering of the condition icon.
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
    #[serde(default)]
    pub country: Option<String>,
}

/// Unit the temperatures are shown in. Payloads are always fetched in Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl DisplayUnit {
    pub fn toggled(self) -> Self {
        match self {
            DisplayUnit::Celsius => DisplayUnit::Fahrenheit,
            DisplayUnit::Fahrenheit => DisplayUnit::Celsius,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "°C",
            DisplayUnit::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DisplayUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "c" | "celsius" => Ok(DisplayUnit::Celsius),
            "f" | "fahrenheit" => Ok(DisplayUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: c (celsius), f (fahrenheit)."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Suggestion {
        Suggestion {
            name: "Paris".into(),
            country: "FR".into(),
            state: None,
            lat: 48.85,
            lon: 2.35,
        }
    }

    #[test]
    fn display_name_without_state_has_no_trailing_segment() {
        assert_eq!(paris().display_name(), "Paris,FR");
        assert_eq!(paris().label(), "Paris, FR");
    }

    #[test]
    fn display_name_with_state() {
        let s = Suggestion { state: Some("Texas".into()), country: "US".into(), ..paris() };
        assert_eq!(s.display_name(), "Paris,US, Texas");
        assert_eq!(s.label(), "Paris, US, Texas");
    }

    #[test]
    fn suggestion_parses_geocoding_row_with_extra_fields() {
        let json = r#"{"name":"London","local_names":{"en":"London"},"lat":51.5,"lon":-0.12,"country":"GB","state":"England"}"#;
        let s: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(s.state.as_deref(), Some("England"));
        assert_eq!(s.country, "GB");
    }

    #[test]
    fn payload_tolerates_missing_optional_fields() {
        let json = r#"{
            "name": "Oslo",
            "weather": [{"main": "Snow", "description": "light snow", "icon": "13d"}],
            "main": {"temp": -3.2, "feels_like": -7.9, "humidity": 86, "pressure": 1002},
            "wind": {"speed": 4.1},
            "sys": {"sunrise": 1700000000, "sunset": 1700020000}
        }"#;
        let payload: WeatherPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.wind.deg, None);
        assert_eq!(payload.visibility, None);
        assert_eq!(payload.timezone, 0);
        assert_eq!(payload.primary_condition().map(|c| c.main.as_str()), Some("Snow"));
        assert_eq!(
            payload.primary_condition().map(ConditionEntry::icon_url).as_deref(),
            Some("https://openweathermap.org/img/wn/13d@2x.png")
        );
    }

    #[test]
    fn unit_toggles_and_parses() {
        assert_eq!(DisplayUnit::Celsius.toggled(), DisplayUnit::Fahrenheit);
        assert_eq!(DisplayUnit::Celsius.toggled().toggled(), DisplayUnit::Celsius);
        assert_eq!("F".parse::<DisplayUnit>().unwrap(), DisplayUnit::Fahrenheit);
        assert!("kelvin".parse::<DisplayUnit>().is_err());
    }
}
