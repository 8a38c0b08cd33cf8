use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use wildfire_core::{Config, Location, ProviderId, WeatherObservation, provider};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wildfire", version, about = "Wildfire risk scoring service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Listen address; overrides the configured one.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Score an observation and print the assessment as JSON.
    Score {
        /// Degrees Celsius.
        #[arg(long, allow_hyphen_values = true)]
        temperature: f64,
        /// Relative humidity, percent.
        #[arg(long, allow_hyphen_values = true)]
        humidity: f64,
        /// Kilometers per hour.
        #[arg(long, allow_hyphen_values = true)]
        wind_speed: f64,
        /// Millimeters over the last hour.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        rainfall: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        longitude: f64,
    },

    /// Fetch current conditions for a city or coordinate pair.
    Weather {
        #[arg(long)]
        city: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Store the API key for an upstream provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "openai".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self, mut config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                if let Some(bind) = bind {
                    config.bind = bind;
                }
                server::serve(&config).await?;
            }
            Command::Score {
                temperature,
                humidity,
                wind_speed,
                rainfall,
                latitude,
                longitude,
            } => {
                let observation = WeatherObservation {
                    temperature,
                    humidity,
                    wind_speed,
                    rainfall,
                    latitude,
                    longitude,
                };
                let assessment = wildfire_core::score(&observation)?;
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            }
            Command::Weather { city, lat, lon } => {
                let location = Location::from_parts(city.as_deref(), lat, lon)?;
                let http = provider::http_client(&config)?;
                let weather = provider::weather_provider_from_config(&config, http);
                let observation = weather.current_conditions(&location).await?;
                println!("{}", serde_json::to_string_pretty(&observation)?);
            }
            Command::Configure { provider } => configure(&provider)?,
        }

        Ok(())
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    // Start from the file alone so environment overrides are not persisted.
    let mut stored = Config::load()?;

    let api_key = Password::new(&format!("{} API key:", id.display_name()))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim().to_string();
    anyhow::ensure!(!api_key.is_empty(), "API key must not be empty");

    stored.upsert_provider_api_key(id, api_key);
    stored.save()?;

    println!(
        "Saved {} API key to {}",
        id.display_name(),
        Config::config_file_path()?.display()
    );
    Ok(())
}
