use crate::{
    Config, WeatherObservation,
    advisory::AdvisoryPrompt,
    error::{Result, WildfireError},
    provider::{openai::OpenAiProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod openai;
pub mod openweather;

/// Upstream services the backend holds credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    OpenAi,
}

impl ProviderId {
    /// Key used in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::OpenAi => "openai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OpenWeather",
            ProviderId::OpenAi => "OpenAI",
        }
    }

    /// Environment variable that overrides the stored API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::OpenAi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "openai" => Ok(ProviderId::OpenAi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, openai."
            )),
        }
    }
}

/// Where to look up current conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Location {
    /// Resolve loose request parameters. A non-blank city takes precedence
    /// over coordinates; a coordinate pair needs both halves.
    pub fn from_parts(city: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> Result<Self> {
        if let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) {
            return Ok(Location::City(city.to_string()));
        }

        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(Location::Coordinates { lat, lon }),
            _ => Err(WildfireError::invalid_argument(
                "Either city or lat/lon must be provided",
            )),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions at `location`, with wind in km/h and rainfall in mm.
    async fn current_conditions(&self, location: &Location) -> Result<WeatherObservation>;
}

#[async_trait]
pub trait LanguageModelProvider: Send + Sync + Debug {
    /// Send a single prompt and return the model's reply text.
    async fn complete(&self, prompt: &AdvisoryPrompt) -> Result<String>;
}

/// HTTP client shared by the upstream adapters, with the configured timeout.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()?;
    Ok(client)
}

/// Construct the weather adapter. A missing API key is not an error here;
/// it is reported when the adapter is first used.
pub fn weather_provider_from_config(config: &Config, http: Client) -> Box<dyn WeatherProvider> {
    let api_key = config.provider_api_key(ProviderId::OpenWeather).map(str::to_owned);
    Box::new(OpenWeatherProvider::new(api_key, http))
}

/// Construct the language-model adapter, deferring credential checks to first use.
pub fn language_model_from_config(
    config: &Config,
    http: Client,
) -> Box<dyn LanguageModelProvider> {
    let api_key = config.provider_api_key(ProviderId::OpenAi).map(str::to_owned);
    Box::new(OpenAiProvider::new(api_key, config.language_model.clone(), http))
}

/// Keep upstream error bodies short enough for logs and error payloads.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
