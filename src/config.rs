//! Typed configuration from environment variables.
//!
//! Loads once at startup. All variables are optional with documented
//! defaults; a variable that is set but empty fails fast as a
//! configuration mistake.

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// OTLP endpoint; unset means spans are not exported.
    pub otel_endpoint: Option<String>,
    /// Service name for the telemetry resource. `OTEL_SERVICE_NAME`,
    /// default "tracekit".
    pub service_name: String,
    /// Comma-separated source names the runtime will export
    /// (`SPAN_SOURCE_ALLOWLIST`). Unset exports all sources.
    pub source_allowlist: Option<Vec<String>>,
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    /// Load configuration, reading a `.env` file first when present.
    ///
    /// In production the environment provides the vars directly.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            otel_endpoint: optional_var("OTEL_ENDPOINT")?,
            service_name: optional_var("OTEL_SERVICE_NAME")?
                .unwrap_or_else(|| "tracekit".to_string()),
            source_allowlist: optional_var("SPAN_SOURCE_ALLOWLIST")?.map(parse_list),
            log_level: optional_var("LOG_LEVEL")?.unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_list(raw: String) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn optional_var(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(Error::Config(format!(
            "environment variable {name} is set but empty"
        ))),
        Ok(value) => Ok(Some(value)),
        Err(_) => Ok(None),
    }
}
