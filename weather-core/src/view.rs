//! Display values derived from a [`WeatherPayload`] and a [`DisplayUnit`].
//!
//! Everything here is pure: no I/O, and the current time is always passed in.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};

use crate::model::{DisplayUnit, WeatherPayload};

/// Convert a Celsius reading for display. Fahrenheit is rounded to two decimals,
/// the precision OpenWeather reports in.
pub fn convert_temperature(celsius: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Celsius => celsius,
        DisplayUnit::Fahrenheit => ((celsius * 9.0 / 5.0 + 32.0) * 100.0).round() / 100.0,
    }
}

/// Qualitative humidity bands, ordered from driest to wettest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HumidityLevel {
    Dry,
    Comfortable,
    Humid,
    VeryHumid,
}

impl fmt::Display for HumidityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HumidityLevel::Dry => "Dry",
            HumidityLevel::Comfortable => "Comfortable",
            HumidityLevel::Humid => "Humid",
            HumidityLevel::VeryHumid => "Very Humid",
        })
    }
}

/// Values above 100 are treated as saturated.
pub fn humidity_level(percent: u8) -> HumidityLevel {
    match percent {
        0..=29 => HumidityLevel::Dry,
        30..=59 => HumidityLevel::Comfortable,
        60..=79 => HumidityLevel::Humid,
        _ => HumidityLevel::VeryHumid,
    }
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass label; each bucket spans 45° centred on its point.
pub fn wind_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 22.5) / 45.0).floor() as usize % COMPASS.len();
    COMPASS[index]
}

/// Qualitative visibility bands, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VisibilityLevel {
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl fmt::Display for VisibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VisibilityLevel::Poor => "Poor",
            VisibilityLevel::Moderate => "Moderate",
            VisibilityLevel::Good => "Good",
            VisibilityLevel::Excellent => "Excellent",
        })
    }
}

pub fn visibility_level(meters: u32) -> VisibilityLevel {
    match meters {
        0..1_000 => VisibilityLevel::Poor,
        1_000..4_000 => VisibilityLevel::Moderate,
        4_000..10_000 => VisibilityLevel::Good,
        _ => VisibilityLevel::Excellent,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherCondition {
    /// OpenWeather condition group, e.g. `Rain` or `Clear`.
    pub main: String,
    /// `now` falls within `[sunrise, sunset)`.
    pub is_day: bool,
}

pub fn weather_condition(
    payload: Option<&WeatherPayload>,
    now: DateTime<Utc>,
) -> Option<WeatherCondition> {
    let payload = payload?;
    let main = payload
        .primary_condition()
        .map(|c| c.main.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let now = now.timestamp();

    Some(WeatherCondition {
        main,
        is_day: now >= payload.sys.sunrise && now < payload.sys.sunset,
    })
}

/// Background scene matching the current condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    ClearDay,
    ClearNight,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Default,
}

impl Backdrop {
    pub fn from_condition(condition: &WeatherCondition) -> Self {
        match condition.main.as_str() {
            "Clear" if condition.is_day => Backdrop::ClearDay,
            "Clear" => Backdrop::ClearNight,
            "Clouds" => Backdrop::Clouds,
            "Rain" => Backdrop::Rain,
            "Drizzle" => Backdrop::Drizzle,
            "Thunderstorm" => Backdrop::Thunderstorm,
            "Snow" => Backdrop::Snow,
            "Mist" | "Smoke" | "Haze" | "Dust" | "Fog" | "Sand" | "Ash" | "Squall"
            | "Tornado" => Backdrop::Mist,
            _ => Backdrop::Default,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Backdrop::ClearDay => "☀",
            Backdrop::ClearNight => "☾",
            Backdrop::Clouds => "☁",
            Backdrop::Rain => "☂",
            Backdrop::Drizzle => "☔",
            Backdrop::Thunderstorm => "⚡",
            Backdrop::Snow => "❄",
            Backdrop::Mist => "≋",
            Backdrop::Default => "·",
        }
    }
}

/// `HH:MM` in the machine's local time zone.
pub fn format_time(unix_seconds: i64) -> String {
    format_time_in(unix_seconds, &Local)
}

/// `HH:MM` in `tz`; timestamps chrono cannot represent render as `--:--`.
pub fn format_time_in<Tz>(unix_seconds: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match DateTime::from_timestamp(unix_seconds, 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Every value the results panel shows, derived once per render.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub unit: DisplayUnit,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    /// Condition icon URL, absent when the payload lists no condition.
    pub icon: Option<String>,
    pub humidity_pct: u8,
    pub humidity: HumidityLevel,
    pub wind_speed_mps: f64,
    pub wind_direction: Option<&'static str>,
    pub visibility: Option<VisibilityLevel>,
    pub pressure_hpa: u32,
    pub sunrise: String,
    pub sunset: String,
    pub condition: WeatherCondition,
    pub backdrop: Backdrop,
}

impl WeatherReport {
    pub fn new(payload: &WeatherPayload, unit: DisplayUnit, now: DateTime<Utc>) -> Self {
        let condition = weather_condition(Some(payload), now).unwrap_or_else(|| WeatherCondition {
            main: "Unknown".to_string(),
            is_day: true,
        });
        // Sun times read best in the location's own clock.
        let offset = FixedOffset::east_opt(payload.timezone).unwrap_or_else(|| Utc.fix());

        Self {
            location: payload.name.clone(),
            unit,
            temperature: convert_temperature(payload.main.temp, unit),
            feels_like: convert_temperature(payload.main.feels_like, unit),
            description: payload
                .primary_condition()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            icon: payload.primary_condition().map(|c| c.icon_url()),
            humidity_pct: payload.main.humidity,
            humidity: humidity_level(payload.main.humidity),
            wind_speed_mps: payload.wind.speed,
            wind_direction: payload.wind.deg.map(wind_direction),
            visibility: payload.visibility.map(visibility_level),
            pressure_hpa: payload.main.pressure,
            sunrise: format_time_in(payload.sys.sunrise, &offset),
            sunset: format_time_in(payload.sys.sunset, &offset),
            backdrop: Backdrop::from_condition(&condition),
            condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConditionEntry, MainReadings, SunTimes, Wind};

    const SUNRISE: i64 = 1_700_000_000;
    const SUNSET: i64 = 1_700_036_000;

    fn payload(main: &str) -> WeatherPayload {
        WeatherPayload {
            name: "Paris".into(),
            weather: vec![ConditionEntry {
                main: main.into(),
                description: "clear sky".into(),
                icon: "01d".into(),
            }],
            main: MainReadings { temp: 20.0, feels_like: 18.5, humidity: 45, pressure: 1015 },
            wind: Wind { speed: 4.2, deg: Some(90.0) },
            visibility: Some(10_000),
            sys: SunTimes { sunrise: SUNRISE, sunset: SUNSET, country: Some("FR".into()) },
            timezone: 3600,
        }
    }

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn converts_known_points() {
        assert_eq!(convert_temperature(0.0, DisplayUnit::Fahrenheit), 32.0);
        assert_eq!(convert_temperature(100.0, DisplayUnit::Celsius), 100.0);
        assert_eq!(convert_temperature(100.0, DisplayUnit::Fahrenheit), 212.0);
        assert_eq!(convert_temperature(-40.0, DisplayUnit::Fahrenheit), -40.0);
        assert_eq!(convert_temperature(21.37, DisplayUnit::Fahrenheit), 70.47);
    }

    #[test]
    fn conversion_does_not_clamp() {
        assert_eq!(convert_temperature(-273.15, DisplayUnit::Fahrenheit), -459.67);
        assert_eq!(convert_temperature(1000.0, DisplayUnit::Fahrenheit), 1832.0);
    }

    #[test]
    fn humidity_bands_are_monotonic_and_cover_range() {
        let levels: Vec<_> = (0..=100).map(humidity_level).collect();
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(levels[0], HumidityLevel::Dry);
        assert_eq!(levels[45], HumidityLevel::Comfortable);
        assert_eq!(levels[100], HumidityLevel::VeryHumid);
        assert_eq!(humidity_level(255), HumidityLevel::VeryHumid);
    }

    #[test]
    fn wind_direction_wraps_at_north() {
        assert_eq!(wind_direction(0.0), wind_direction(360.0));
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(350.0), "N");
        assert_eq!(wind_direction(22.4), "N");
        assert_eq!(wind_direction(22.5), "NE");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(225.0), "SW");
        assert_eq!(wind_direction(337.5), "N");
        assert_eq!(wind_direction(-90.0), "W");
        assert_eq!(wind_direction(720.0 + 180.0), "S");
    }

    #[test]
    fn visibility_extremes() {
        assert_eq!(visibility_level(0), VisibilityLevel::Poor);
        assert_eq!(visibility_level(2_500), VisibilityLevel::Moderate);
        assert_eq!(visibility_level(9_999), VisibilityLevel::Good);
        assert_eq!(visibility_level(10_000), VisibilityLevel::Excellent);
        assert_eq!(visibility_level(u32::MAX), VisibilityLevel::Excellent);
    }

    #[test]
    fn condition_is_night_before_sunrise() {
        let p = payload("Clear");

        let before = weather_condition(Some(&p), at(SUNRISE - 1)).unwrap();
        assert!(!before.is_day);
        assert!(weather_condition(Some(&p), at(SUNRISE)).unwrap().is_day);
        assert!(!weather_condition(Some(&p), at(SUNSET)).unwrap().is_day);
        assert_eq!(before.main, "Clear");
    }

    #[test]
    fn condition_absent_without_payload() {
        assert_eq!(weather_condition(None, at(SUNRISE)), None);
    }

    #[test]
    fn backdrop_follows_condition_and_daylight() {
        let day = WeatherCondition { main: "Clear".into(), is_day: true };
        let night = WeatherCondition { main: "Clear".into(), is_day: false };
        let fog = WeatherCondition { main: "Fog".into(), is_day: true };
        let odd = WeatherCondition { main: "Meteors".into(), is_day: true };

        assert_eq!(Backdrop::from_condition(&day), Backdrop::ClearDay);
        assert_eq!(Backdrop::from_condition(&night), Backdrop::ClearNight);
        assert_eq!(Backdrop::from_condition(&fog), Backdrop::Mist);
        assert_eq!(Backdrop::from_condition(&odd), Backdrop::Default);
    }

    #[test]
    fn formats_hour_and_minute() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();

        // 2023-11-14T22:13:20Z
        assert_eq!(format_time_in(SUNRISE, &utc), "22:13");
        assert_eq!(format_time_in(SUNRISE, &cet), "23:13");
        assert_eq!(format_time_in(i64::MAX, &utc), "--:--");
        assert_eq!(format_time(SUNRISE).len(), 5);
    }

    #[test]
    fn report_derives_all_display_fields() {
        let p = payload("Clear");
        let report = WeatherReport::new(&p, DisplayUnit::Fahrenheit, at(SUNRISE + 60));

        assert_eq!(report.location, "Paris");
        assert_eq!(report.icon.as_deref(), Some("https://openweathermap.org/img/wn/01d@2x.png"));
        assert_eq!(report.temperature, 68.0);
        assert_eq!(report.feels_like, 65.3);
        assert_eq!(report.humidity, HumidityLevel::Comfortable);
        assert_eq!(report.wind_direction, Some("E"));
        assert_eq!(report.visibility, Some(VisibilityLevel::Excellent));
        assert_eq!(report.sunrise, "23:13");
        assert_eq!(report.backdrop, Backdrop::ClearDay);
    }

    #[test]
    fn report_handles_missing_wind_direction_and_visibility() {
        let mut p = payload("Rain");
        p.wind.deg = None;
        p.visibility = None;

        let report = WeatherReport::new(&p, DisplayUnit::Celsius, at(SUNSET + 60));

        assert_eq!(report.temperature, 20.0);
        assert_eq!(report.wind_direction, None);
        assert_eq!(report.visibility, None);
        assert_eq!(report.backdrop, Backdrop::Rain);
        assert!(!report.condition.is_day);
    }
}
