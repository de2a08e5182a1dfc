//! Client configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use url::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_DELAY, PollConfig};
use crate::outbound::http::HttpClientConfig;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8001";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL does not parse.
    #[error("invalid api_base_url '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    /// A value that must be positive was zero.
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Settings for the API client and result poller.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SELFMAP")]
pub struct ClientSettings {
    /// Base URL of the selfmap API.
    pub api_base_url: Option<String>,
    /// Deadline for ordinary requests, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Deadline for text generation requests, in seconds.
    pub generation_timeout_secs: Option<u64>,
    /// Probe budget when waiting for the analysis.
    pub poll_max_attempts: Option<u32>,
    /// Delay between analysis probes, in milliseconds.
    pub poll_delay_ms: Option<u64>,
    /// Bearer token for authenticated requests.
    pub token: Option<String>,
}

fn positive(field: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { field })
    } else {
        Ok(value)
    }
}

impl ClientSettings {
    /// Configured base URL, falling back to the local development server.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Configured bearer token, ignoring blank values.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.trim().is_empty())
    }

    /// Build the HTTP adapter settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparsable URL or a zero timeout.
    pub fn http_client_config(&self) -> Result<HttpClientConfig, ConfigError> {
        let raw = self.api_base_url();
        let base_url = Url::parse(raw).map_err(|error| ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            reason: error.to_string(),
        })?;
        let request = positive(
            "request_timeout_secs",
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )?;
        let generation = positive(
            "generation_timeout_secs",
            self.generation_timeout_secs
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
        )?;
        Ok(HttpClientConfig {
            base_url,
            request_timeout: Duration::from_secs(request),
            generation_timeout: Duration::from_secs(generation),
        })
    }

    /// Build the poll budget for the analysis screen.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] when the attempt budget is zero.
    pub fn poll_config(&self) -> Result<PollConfig, ConfigError> {
        let max_attempts = self.poll_max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::Zero {
                field: "poll_max_attempts",
            });
        }
        let delay = self
            .poll_delay_ms
            .map_or(DEFAULT_POLL_DELAY, Duration::from_millis);
        Ok(PollConfig {
            max_attempts,
            delay,
        })
    }
}
