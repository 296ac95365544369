//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider (geocoding + current weather)
//! - The search-and-resolve flow with debounced suggestions
//! - Pure display derivations over a weather payload
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod search;
pub mod view;

pub use config::Config;
pub use error::WeatherError;
pub use model::{DisplayUnit, Suggestion, WeatherPayload, WeatherQuery};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use search::{SearchController, SearchEvent, SearchEvents, SearchState};
pub use view::WeatherReport;
