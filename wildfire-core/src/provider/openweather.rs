use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    WeatherObservation,
    error::{Result, WildfireError},
    provider::{Location, ProviderId},
};

use super::{WeatherProvider, truncate_body};

const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            http,
        }
    }

    /// Point the adapter at a different host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_current(
        &self,
        api_key: &str,
        location: &Location,
    ) -> Result<WeatherObservation> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let mut query: Vec<(&str, String)> =
            vec![("appid", api_key.to_string()), ("units", "metric".to_string())];
        match location {
            Location::City(name) => query.push(("q", name.clone())),
            Location::Coordinates { lat, lon } => {
                query.push(("lat", lat.to_string()));
                query.push(("lon", lon.to_string()));
            }
        }

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| upstream_error(format!("failed to send request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| upstream_error(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!(%status, %location, "OpenWeather current request failed");
            return Err(WildfireError::upstream_status(
                ProviderId::OpenWeather,
                status.as_u16(),
                format!(
                    "Failed to fetch weather data (status {status}): {}",
                    truncate_body(&body)
                ),
            ));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| upstream_error(format!("failed to parse current weather JSON: {e}")))?;

        debug!(%location, "fetched current conditions");
        Ok(parsed.into_observation())
    }
}

fn upstream_error(message: String) -> WildfireError {
    WildfireError::upstream(ProviderId::OpenWeather, message)
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    main: OwMain,
    wind: OwWind,
    #[serde(default)]
    rain: Option<OwRain>,
}

impl OwCurrentResponse {
    fn into_observation(self) -> WeatherObservation {
        // No rain block means no rain in the last hour, not missing data.
        let rainfall = self.rain.and_then(|r| r.one_hour).unwrap_or(0.0);

        WeatherObservation {
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed * MPS_TO_KMH,
            rainfall,
            latitude: self.coord.lat,
            longitude: self.coord.lon,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_conditions(&self, location: &Location) -> Result<WeatherObservation> {
        let api_key = self.api_key.as_deref().ok_or(WildfireError::Configuration {
            provider: ProviderId::OpenWeather,
        })?;

        self.fetch_current(api_key, location).await
    }
}
