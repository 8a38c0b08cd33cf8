//! Deterministic wildfire risk scoring.
//!
//! Each weather variable is normalized to a 0-100 factor (the rain factor
//! goes negative above 100 mm), the factors are combined with fixed weights,
//! and the composite score drives the level, the confidence heuristic and
//! the per-factor attribution.

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{FactorAttribution, RiskAssessment, RiskLevel, WeatherObservation};

const TEMPERATURE_SATURATION_C: f64 = 45.0;
const WIND_SATURATION_KMH: f64 = 50.0;
const RAINFALL_REFERENCE_MM: f64 = 100.0;

const TEMPERATURE_WEIGHT: f64 = 0.4;
const HUMIDITY_WEIGHT: f64 = 0.3;
const WIND_WEIGHT: f64 = 0.2;
const RAIN_WEIGHT: f64 = 0.1;

/// Scores strictly above this are classified as high risk.
const HIGH_RISK_THRESHOLD: f64 = 60.0;

const BASE_CONFIDENCE: f64 = 50.0;
const MAX_ADDITIONAL_CONFIDENCE: f64 = 20.0;

/// Normalized factor values for one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFactors {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
    /// Not clipped below zero: heavy rain actively lowers the score.
    pub rain: f64,
}

impl RiskFactors {
    pub fn from_observation(obs: &WeatherObservation) -> Self {
        Self {
            temperature: (obs.temperature / TEMPERATURE_SATURATION_C * 100.0).min(100.0),
            humidity: (1.0 - obs.humidity / 100.0) * 100.0,
            wind: (obs.wind_speed / WIND_SATURATION_KMH * 100.0).min(100.0),
            rain: (1.0 - obs.rainfall / RAINFALL_REFERENCE_MM) * 100.0,
        }
    }

    /// Weighted composite of the four factors.
    pub fn risk_score(&self) -> f64 {
        TEMPERATURE_WEIGHT * self.temperature
            + HUMIDITY_WEIGHT * self.humidity
            + WIND_WEIGHT * self.wind
            + RAIN_WEIGHT * self.rain
    }

    pub fn total(&self) -> f64 {
        self.temperature + self.humidity + self.wind + self.rain
    }

    /// Each factor's share of the factor total, in percent.
    ///
    /// Shares are taken over the rain factor clipped to [0, 100], so every
    /// share lies in [0, 100] and they sum to 100. When all clipped factors
    /// are zero there is nothing to split and every share is reported as 0.
    pub fn attribution(&self) -> FactorAttribution {
        let rain = self.rain.clamp(0.0, 100.0);
        let total = self.temperature + self.humidity + self.wind + rain;
        if !total.is_finite() || total <= 0.0 {
            warn!(
                total,
                rain = self.rain,
                "factor total is not positive; attribution reported as zero"
            );
            return FactorAttribution::default();
        }

        let share = |factor: f64| round1(factor / total * 100.0);
        FactorAttribution {
            temperature: share(self.temperature),
            humidity: share(self.humidity),
            wind_speed: share(self.wind),
            rainfall: share(rain),
        }
    }
}

pub fn classify(risk_score: f64) -> RiskLevel {
    if risk_score > HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}

/// Display heuristic in [50, 70], monotonic in the risk score.
pub fn confidence(risk_score: f64) -> f64 {
    let additional = (risk_score / 100.0 * MAX_ADDITIONAL_CONFIDENCE)
        .clamp(0.0, MAX_ADDITIONAL_CONFIDENCE);
    round1(BASE_CONFIDENCE + additional)
}

/// Validate `obs` and score it.
pub fn score(obs: &WeatherObservation) -> Result<RiskAssessment> {
    obs.validate()?;

    let factors = RiskFactors::from_observation(obs);
    let risk_score = factors.risk_score();
    let assessment = RiskAssessment {
        risk: classify(risk_score),
        confidence: confidence(risk_score),
        factors: factors.attribution(),
    };

    debug!(
        risk_score,
        risk = %assessment.risk,
        confidence = assessment.confidence,
        "scored observation"
    );
    Ok(assessment)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WildfireError;

    fn obs(temperature: f64, humidity: f64, wind_speed: f64, rainfall: f64) -> WeatherObservation {
        WeatherObservation {
            temperature,
            humidity,
            wind_speed,
            rainfall,
            latitude: 38.5,
            longitude: -121.5,
        }
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn temperature_factor_saturates_at_45() {
        let at_saturation = RiskFactors::from_observation(&obs(45.0, 50.0, 0.0, 0.0));
        let above = RiskFactors::from_observation(&obs(60.0, 50.0, 0.0, 0.0));

        assert_eq!(at_saturation.temperature, 100.0);
        assert_eq!(above.temperature, 100.0);
    }

    #[test]
    fn humidity_factor_is_inverse() {
        let dry = RiskFactors::from_observation(&obs(20.0, 0.0, 0.0, 0.0));
        let saturated = RiskFactors::from_observation(&obs(20.0, 100.0, 0.0, 0.0));

        assert_eq!(dry.humidity, 100.0);
        assert_eq!(saturated.humidity, 0.0);
    }

    #[test]
    fn wind_factor_saturates_at_50() {
        let at_saturation = RiskFactors::from_observation(&obs(20.0, 50.0, 50.0, 0.0));
        let above = RiskFactors::from_observation(&obs(20.0, 50.0, 90.0, 0.0));

        assert_eq!(at_saturation.wind, 100.0);
        assert_eq!(above.wind, 100.0);
    }

    #[test]
    fn rain_factor_goes_negative_above_100mm() {
        let factors = RiskFactors::from_observation(&obs(20.0, 50.0, 0.0, 250.0));
        assert_eq!(factors.rain, -150.0);
    }

    #[test]
    fn hot_dry_windy_scores_high() {
        let factors = RiskFactors::from_observation(&obs(30.0, 20.0, 40.0, 0.0));
        assert_close(factors.temperature, 66.67, 0.01);
        assert_close(factors.humidity, 80.0, 1e-9);
        assert_close(factors.wind, 80.0, 1e-9);
        assert_close(factors.rain, 100.0, 1e-9);
        assert_close(factors.risk_score(), 76.67, 0.01);

        let assessment = score(&obs(30.0, 20.0, 40.0, 0.0)).expect("valid observation");
        assert_eq!(assessment.risk, RiskLevel::High);
        assert_eq!(assessment.confidence, 65.3);
    }

    #[test]
    fn cool_humid_calm_scores_low() {
        let factors = RiskFactors::from_observation(&obs(10.0, 80.0, 5.0, 50.0));
        assert_close(factors.temperature, 22.2, 0.05);
        assert_close(factors.humidity, 20.0, 1e-9);
        assert_close(factors.wind, 10.0, 1e-9);
        assert_close(factors.rain, 50.0, 1e-9);
        assert_close(factors.risk_score(), 21.9, 0.05);

        let assessment = score(&obs(10.0, 80.0, 5.0, 50.0)).expect("valid observation");
        assert_eq!(assessment.risk, RiskLevel::Low);
        assert_eq!(assessment.confidence, 54.4);
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(classify(60.0), RiskLevel::Low);
        assert_eq!(classify(60.01), RiskLevel::High);
    }

    #[test]
    fn attribution_matches_factor_shares() {
        let assessment = score(&obs(30.0, 20.0, 40.0, 0.0)).expect("valid observation");
        let factors = assessment.factors;

        assert_eq!(factors.temperature, 20.4);
        assert_eq!(factors.humidity, 24.5);
        assert_eq!(factors.wind_speed, 24.5);
        assert_eq!(factors.rainfall, 30.6);
    }

    #[test]
    fn invariants_hold_across_valid_grid() {
        for temperature in [0.0, 12.5, 30.0, 45.0, 60.0] {
            for humidity in [0.0, 35.0, 70.0, 100.0] {
                for wind_speed in [0.0, 25.0, 50.0, 100.0] {
                    for rainfall in [0.0, 40.0, 100.0, 180.0, 250.0, 500.0] {
                        let o = obs(temperature, humidity, wind_speed, rainfall);
                        let factors = RiskFactors::from_observation(&o);
                        let assessment = score(&o).expect("grid values are in range");

                        assert!(assessment.confidence.is_finite());
                        assert!((50.0..=70.0).contains(&assessment.confidence));
                        for (_, share) in assessment.factors.entries() {
                            assert!((0.0..=100.0).contains(&share), "share {share} for {o:?}");
                        }

                        let clipped_total = factors.temperature
                            + factors.humidity
                            + factors.wind
                            + factors.rain.max(0.0);
                        if clipped_total > 0.0 {
                            assert_close(assessment.factors.total(), 100.0, 0.2);
                        } else {
                            assert_eq!(assessment.factors, FactorAttribution::default());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn non_positive_factor_total_zeroes_attribution() {
        // Heavy rain, saturated humidity, no heat or wind.
        let assessment = score(&obs(0.0, 100.0, 0.0, 500.0)).expect("valid observation");

        assert_eq!(assessment.factors, FactorAttribution::default());
        assert_eq!(assessment.risk, RiskLevel::Low);
        assert_eq!(assessment.confidence, 50.0);
    }

    #[test]
    fn small_positive_factor_total_keeps_shares_bounded() {
        // Raw factors 10 + 0 + 0 + (-9.9): the raw total is barely positive.
        let o = obs(4.5, 100.0, 0.0, 109.9);
        let factors = RiskFactors::from_observation(&o);
        assert!(factors.total() > 0.0 && factors.total() < 1.0);

        let assessment = score(&o).expect("valid observation");

        assert_eq!(assessment.factors.temperature, 100.0);
        assert_eq!(assessment.factors.humidity, 0.0);
        assert_eq!(assessment.factors.wind_speed, 0.0);
        assert_eq!(assessment.factors.rainfall, 0.0);
    }

    #[test]
    fn heavy_rain_contributes_no_share() {
        let assessment = score(&obs(45.0, 0.0, 50.0, 250.0)).expect("valid observation");
        let factors = assessment.factors;

        assert_eq!(factors.rainfall, 0.0);
        assert_eq!(factors.temperature, 33.3);
        assert_eq!(factors.humidity, 33.3);
        assert_eq!(factors.wind_speed, 33.3);
    }

    #[test]
    fn confidence_is_monotonic_and_bounded() {
        let mut previous = confidence(-50.0);
        assert_eq!(previous, 50.0);

        for step in 0..=30 {
            let current = confidence(step as f64 * 5.0);
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(confidence(150.0), 70.0);
    }

    #[test]
    fn out_of_range_input_fails_whole_operation() {
        let err = score(&obs(61.0, 20.0, 40.0, 0.0)).unwrap_err();
        assert!(matches!(err, WildfireError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Temperature must be between 0 and 60°C");
    }
}
