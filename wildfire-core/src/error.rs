use thiserror::Error;

use crate::provider::ProviderId;

/// Failures surfaced by the scoring pipeline and the upstream adapters.
///
/// Every failure is total: an operation returning one of these produced no
/// partial assessment, observation or advisory.
#[derive(Debug, Error)]
pub enum WildfireError {
    /// Caller-supplied input failed a precondition.
    #[error("{0}")]
    InvalidArgument(String),

    /// A required upstream credential is not configured.
    #[error("{} API key not configured", .provider.display_name())]
    Configuration { provider: ProviderId },

    /// The upstream provider was unreachable, failed, or returned unreadable data.
    #[error("{} request failed: {message}", .provider.display_name())]
    Upstream {
        provider: ProviderId,
        status: Option<u16>,
        message: String,
    },
}

impl WildfireError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn upstream(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            status: None,
            message: message.into(),
        }
    }

    pub fn upstream_status(provider: ProviderId, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Short machine-readable kind used in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Configuration { .. } => "configuration",
            Self::Upstream { .. } => "upstream",
        }
    }
}

pub type Result<T> = std::result::Result<T, WildfireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_provider() {
        let err = WildfireError::Configuration {
            provider: ProviderId::OpenWeather,
        };
        assert_eq!(err.to_string(), "OpenWeather API key not configured");
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn upstream_error_keeps_status() {
        let err = WildfireError::upstream_status(ProviderId::OpenAi, 429, "rate limited");
        match err {
            WildfireError::Upstream { status, .. } => assert_eq!(status, Some(429)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_argument_displays_message_verbatim() {
        let err = WildfireError::invalid_argument("Humidity must be between 0 and 100%");
        assert_eq!(err.to_string(), "Humidity must be between 0 and 100%");
        assert_eq!(err.kind(), "invalid_argument");
    }
}
