//! Core library for the wildfire risk service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The deterministic risk scoring pipeline
//! - Advisory prompt composition
//! - Adapters for the upstream weather and language-model providers
//!
//! It is used by `wildfire-cli`, which also hosts the HTTP gateway.

pub mod advisory;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod risk;

pub use advisory::{AdvisoryPrompt, AdvisoryRequest, ObservedConditions, PriorAssessment};
pub use config::{Config, ProviderConfig};
pub use error::WildfireError;
pub use model::{FactorAttribution, RiskAssessment, RiskLevel, WeatherObservation};
pub use provider::{LanguageModelProvider, Location, ProviderId, WeatherProvider};
pub use risk::{RiskFactors, score};
