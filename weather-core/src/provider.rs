use crate::{
    error::WeatherError,
    model::{Suggestion, WeatherPayload, WeatherQuery},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Remote source of geocoding matches and current weather.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve free text to at most `limit` places, in the order the service returns them.
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, WeatherError>;

    /// Fetch current conditions in metric units.
    async fn current_weather(&self, target: &WeatherQuery) -> Result<WeatherPayload, WeatherError>;
}
