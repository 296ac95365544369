use std::fmt::Write;

use chrono::Utc;
use weather_core::{DisplayUnit, WeatherPayload, WeatherReport};

/// Results panel for a loaded payload.
pub fn report(payload: &WeatherPayload, unit: DisplayUnit) -> String {
    format_report(&WeatherReport::new(payload, unit, Utc::now()))
}

fn format_report(r: &WeatherReport) -> String {
    let mut out = String::new();
    let unit = r.unit.symbol();

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}  {}", r.backdrop.glyph(), r.location);
    let _ = writeln!(out, "  {}{}  {}", r.temperature, unit, r.description);
    if let Some(icon) = &r.icon {
        let _ = writeln!(out, "  {icon}");
    }
    let _ = writeln!(out);

    let wind = match r.wind_direction {
        Some(dir) => format!("{} m/s ({dir})", r.wind_speed_mps),
        None => format!("{} m/s", r.wind_speed_mps),
    };
    let visibility = r.visibility.map_or_else(|| "n/a".to_string(), |v| v.to_string());

    let _ = writeln!(out, "  Humidity    {}% ({})", r.humidity_pct, r.humidity);
    let _ = writeln!(out, "  Wind        {wind}");
    let _ = writeln!(out, "  Visibility  {visibility}");
    let _ = writeln!(out, "  Sunrise     {}", r.sunrise);
    let _ = writeln!(out, "  Sunset      {}", r.sunset);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Feels like  {}{}", r.feels_like, unit);
    let _ = writeln!(out, "  Pressure    {} hPa", r.pressure_hpa);

    out
}

/// Error banner shown under the prompt.
pub fn error(message: &str) -> String {
    format!("  ✖ {}", message.trim())
}
