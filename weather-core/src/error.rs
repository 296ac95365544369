use thiserror::Error;

/// Fallback message when OpenWeather rejects a request without a readable body.
pub const NOT_FOUND_FALLBACK: &str = "City not found";

/// Errors surfaced by the weather lookup flow.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The user submitted an empty or whitespace-only city name.
    #[error("Please enter a valid City Name")]
    EmptyQuery,

    /// No usable API key; detected before any request is built.
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `weather configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,

    /// OpenWeather answered with a non-success status.
    #[error("{0}")]
    Api(String),

    #[error("Failed to reach OpenWeather: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse OpenWeather response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WeatherError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, WeatherError::MissingApiKey)
    }
}
