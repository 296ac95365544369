use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, Select};
use weather_core::{Config, DisplayUnit, OpenWeatherProvider, SearchController, SearchEvents};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup CLI")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Temperature unit: c or f. Defaults to the configured unit.
    #[arg(long, global = true)]
    pub unit: Option<DisplayUnit>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the preferred unit.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Search interactively with autocomplete.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => {
                let (mut controller, _events) = build_controller(self.unit)?;
                controller.on_query_change(city);
                controller.submit_search().await;

                let state = controller.state();
                if let Some(error) = &state.error {
                    anyhow::bail!("{error}");
                }
                if let Some(payload) = &state.weather {
                    print!("{}", render::report(payload, state.unit));
                }
                Ok(())
            }
            Command::Search => {
                let (controller, events) = build_controller(self.unit)?;
                session::run(controller, events).await
            }
        }
    }
}

/// Load config (file + env) and fail fast when no API key is available.
fn build_controller(
    unit: Option<DisplayUnit>,
) -> anyhow::Result<(SearchController, SearchEvents)> {
    let mut config = Config::load()?;
    config.apply_env(|name| std::env::var(name).ok());

    let provider = OpenWeatherProvider::from_config(&config)?;
    let (controller, events) = SearchController::new(Arc::new(provider));

    Ok((controller.with_unit(unit.unwrap_or(config.default_unit)), events))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let units = vec![DisplayUnit::Celsius, DisplayUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    config.default_unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read default unit")?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
