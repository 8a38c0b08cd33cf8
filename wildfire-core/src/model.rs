use serde::{Deserialize, Serialize};

use crate::error::{Result, WildfireError};

/// Weather conditions at a single point, as scored by the risk pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Kilometers per hour.
    pub wind_speed: f64,
    /// Millimeters over the trailing hour.
    pub rainfall: f64,
    pub latitude: f64,
    pub longitude: f64,
}

struct FieldRange {
    label: &'static str,
    min: f64,
    max: f64,
    unit: &'static str,
}

const TEMPERATURE_RANGE: FieldRange = FieldRange {
    label: "Temperature",
    min: 0.0,
    max: 60.0,
    unit: "°C",
};
const HUMIDITY_RANGE: FieldRange = FieldRange {
    label: "Humidity",
    min: 0.0,
    max: 100.0,
    unit: "%",
};
const WIND_SPEED_RANGE: FieldRange = FieldRange {
    label: "Wind speed",
    min: 0.0,
    max: 100.0,
    unit: " km/h",
};
const RAINFALL_RANGE: FieldRange = FieldRange {
    label: "Rainfall",
    min: 0.0,
    max: 500.0,
    unit: " mm",
};

impl FieldRange {
    fn check(&self, value: f64) -> Result<()> {
        // NaN fails `contains`, so it is rejected like any other out-of-range value.
        if (self.min..=self.max).contains(&value) {
            Ok(())
        } else {
            Err(WildfireError::invalid_argument(format!(
                "{} must be between {} and {}{}",
                self.label, self.min, self.max, self.unit
            )))
        }
    }
}

impl WeatherObservation {
    /// Range-check every scored field, failing on the first violation.
    pub fn validate(&self) -> Result<()> {
        TEMPERATURE_RANGE.check(self.temperature)?;
        HUMIDITY_RANGE.check(self.humidity)?;
        WIND_SPEED_RANGE.check(self.wind_speed)?;
        RAINFALL_RANGE.check(self.rainfall)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage share of each factor in the combined risk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactorAttribution {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
}

impl FactorAttribution {
    /// `(wire name, share)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("windSpeed", self.wind_speed),
            ("rainfall", self.rainfall),
        ]
    }

    pub fn total(&self) -> f64 {
        self.temperature + self.humidity + self.wind_speed + self.rainfall
    }
}

/// Result of scoring one observation.
///
/// `confidence` is a display heuristic in [50, 70] that grows with the risk
/// score. It is not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    pub confidence: f64,
    pub factors: FactorAttribution,
}
