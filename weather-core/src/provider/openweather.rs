use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::{NOT_FOUND_FALLBACK, WeatherError},
    model::{Suggestion, WeatherPayload, WeatherQuery},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Build a provider from config, failing before any request when no key is set.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.api_key()?;
        Ok(Self::new(api_key.to_owned(), config.base_url()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(WeatherError::Api(error_message(&body)));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Error body shape: `{"cod":"404","message":"city not found"}`.
#[derive(Debug, Deserialize)]
struct OwError {
    message: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<OwError>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| NOT_FOUND_FALLBACK.to_string())
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, WeatherError> {
        self.get_json(
            "/geo/1.0/direct",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn current_weather(&self, target: &WeatherQuery) -> Result<WeatherPayload, WeatherError> {
        let mut query = match target {
            WeatherQuery::City(name) => vec![("q", name.clone())],
            WeatherQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        query.push(("units", "metric".to_string()));

        self.get_json("/data/2.5/weather", &query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_body_message() {
        assert_eq!(error_message(r#"{"cod":"404","message":"city not found"}"#), "city not found");
    }

    #[test]
    fn error_message_falls_back_when_body_is_not_json() {
        assert_eq!(error_message("Bad Gateway"), NOT_FOUND_FALLBACK);
        assert_eq!(error_message(r#"{"cod":"404"}"#), NOT_FOUND_FALLBACK);
        assert_eq!(error_message(r#"{"message":""}"#), NOT_FOUND_FALLBACK);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn from_config_requires_api_key() {
        let err = OpenWeatherProvider::from_config(&Config::default()).unwrap_err();
        assert!(err.is_configuration());

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        assert!(OpenWeatherProvider::from_config(&cfg).is_ok());
    }
}
