//! HTTP gateway: weather fetch, risk scoring and advisory chat.

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use wildfire_core::{
    AdvisoryRequest, Config, LanguageModelProvider, Location, ProviderId, RiskAssessment,
    WeatherObservation, WeatherProvider, WildfireError, provider,
};

/// Shared, read-only state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherProvider>,
    pub language_model: Arc<dyn LanguageModelProvider>,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = provider::http_client(config).context("Failed to build upstream HTTP client")?;

        Ok(Self {
            weather: provider::weather_provider_from_config(config, http.clone()).into(),
            language_model: provider::language_model_from_config(config, http).into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

/// A failed operation, tagged with where it failed for logging.
#[derive(Debug)]
pub struct ApiError {
    operation: &'static str,
    error: WildfireError,
}

impl ApiError {
    fn new(operation: &'static str, error: WildfireError) -> Self {
        Self { operation, error }
    }

    fn status(&self) -> StatusCode {
        match &self.error {
            WildfireError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            WildfireError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // Weather failures keep the upstream status; model failures are always ours.
            WildfireError::Upstream {
                provider: ProviderId::OpenWeather,
                status: Some(code),
                ..
            } => StatusCode::from_u16(*code)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            WildfireError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.error {
            WildfireError::InvalidArgument(_) => {
                warn!(operation = self.operation, error = %self.error, "rejected request")
            }
            WildfireError::Configuration { provider }
            | WildfireError::Upstream { provider, .. } => {
                error!(
                    operation = self.operation,
                    %provider,
                    %status,
                    error = %self.error,
                    "request failed"
                )
            }
        }

        let body = ErrorBody {
            error: self.error.kind().to_string(),
            detail: self.error.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn rejected(operation: &'static str, detail: String) -> ApiError {
    ApiError::new(operation, WildfireError::InvalidArgument(detail))
}

/// GET /weather?city=..|lat=..&lon=..
async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherObservation>, ApiError> {
    const OP: &str = "fetch_weather";

    let Query(query) = query.map_err(|e| rejected(OP, e.body_text()))?;
    let location = Location::from_parts(query.city.as_deref(), query.lat, query.lon)
        .map_err(|e| ApiError::new(OP, e))?;

    let observation = state
        .weather
        .current_conditions(&location)
        .await
        .map_err(|e| ApiError::new(OP, e))?;
    Ok(Json(observation))
}

/// POST /predict
async fn predict(
    body: Result<Json<WeatherObservation>, JsonRejection>,
) -> Result<Json<RiskAssessment>, ApiError> {
    const OP: &str = "score_risk";

    let Json(observation) = body.map_err(|e| rejected(OP, e.body_text()))?;
    let assessment = wildfire_core::score(&observation).map_err(|e| ApiError::new(OP, e))?;
    Ok(Json(assessment))
}

/// POST /chat
async fn chat(
    State(state): State<AppState>,
    body: Result<Json<AdvisoryRequest>, JsonRejection>,
) -> Result<Json<AdvisoryResponse>, ApiError> {
    const OP: &str = "advisory";

    let Json(request) = body.map_err(|e| rejected(OP, e.body_text()))?;
    let prompt = request.compose();
    let message = state
        .language_model
        .complete(&prompt)
        .await
        .map_err(|e| ApiError::new(OP, e))?;
    Ok(Json(AdvisoryResponse { message }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Credentialed CORS needs explicit origins, so `*` is dropped like any
/// other unusable entry.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            if origin.trim() == "*" {
                warn!("ignoring wildcard allowed origin; list origins explicitly");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "ignoring invalid allowed origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/predict", post(predict))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("wildfire risk API listening on http://{}", config.bind);

    for id in ProviderId::all() {
        if !config.is_provider_configured(*id) {
            warn!(
                provider = %id,
                "no API key configured; dependent endpoint will fail until one is set"
            );
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("wildfire risk API stopped");
    Ok(())
}
