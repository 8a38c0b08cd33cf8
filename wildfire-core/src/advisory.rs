//! Prompt composition for the wildfire advisory chat.

use serde::{Deserialize, Serialize};

use crate::model::{FactorAttribution, RiskAssessment, RiskLevel, WeatherObservation};

pub const SYSTEM_PROMPT: &str =
    "You are a wildfire risk expert. Provide clear, actionable advice based on the prediction data.";

const PLACEHOLDER: &str = "N/A";

/// Risk assessment echoed back by the client. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorAssessment {
    pub risk: Option<RiskLevel>,
    pub confidence: Option<f64>,
    pub factors: Option<FactorAttribution>,
}

impl From<RiskAssessment> for PriorAssessment {
    fn from(a: RiskAssessment) -> Self {
        Self {
            risk: Some(a.risk),
            confidence: Some(a.confidence),
            factors: Some(a.factors),
        }
    }
}

/// Observation fields as the client last submitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservedConditions {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub rainfall: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<WeatherObservation> for ObservedConditions {
    fn from(o: WeatherObservation) -> Self {
        Self {
            temperature: Some(o.temperature),
            humidity: Some(o.humidity),
            wind_speed: Some(o.wind_speed),
            rainfall: Some(o.rainfall),
            latitude: Some(o.latitude),
            longitude: Some(o.longitude),
        }
    }
}

/// Body of an advisory request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub message: String,
    #[serde(default)]
    pub prediction_result: Option<PriorAssessment>,
    #[serde(default)]
    pub user_inputs: Option<ObservedConditions>,
}

/// A single system + user exchange for the language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryPrompt {
    pub system: String,
    pub user: String,
}

impl AdvisoryPrompt {
    pub fn new(user: String) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}

fn field(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

/// Build the advisory prompt. Output is fully determined by the inputs.
pub fn compose(
    question: &str,
    assessment: Option<&PriorAssessment>,
    observation: Option<&ObservedConditions>,
) -> AdvisoryPrompt {
    let empty_assessment = PriorAssessment::default();
    let empty_observation = ObservedConditions::default();
    let a = assessment.unwrap_or(&empty_assessment);
    let o = observation.unwrap_or(&empty_observation);

    let risk = a.risk.map_or("Unknown", |r| r.as_str());
    let confidence = a.confidence.unwrap_or(0.0);
    let factor_lines: String = a
        .factors
        .map(|factors| {
            factors
                .entries()
                .iter()
                .map(|(name, share)| format!("- {name}: {share}%\n"))
                .collect()
        })
        .unwrap_or_default();

    let user = format!(
        "Based on this wildfire prediction data:\n\n\
         Risk Level: {risk}\n\
         Confidence: {confidence}%\n\n\
         Current Conditions:\n\
         - Temperature: {temperature}°C\n\
         - Humidity: {humidity}%\n\
         - Wind Speed: {wind_speed} km/h\n\
         - Rainfall: {rainfall} mm\n\
         - Location: {latitude}, {longitude}\n\n\
         Contributing Factors:\n\
         {factor_lines}\n\
         User question: {question}\n\n\
         Please respond like a helpful wildfire risk advisor, \
         focusing on the specific data provided.",
        temperature = field(o.temperature),
        humidity = field(o.humidity),
        wind_speed = field(o.wind_speed),
        rainfall = field(o.rainfall),
        latitude = field(o.latitude),
        longitude = field(o.longitude),
    );

    AdvisoryPrompt::new(user)
}

impl AdvisoryRequest {
    pub fn compose(&self) -> AdvisoryPrompt {
        compose(
            &self.message,
            self.prediction_result.as_ref(),
            self.user_inputs.as_ref(),
        )
    }
}
