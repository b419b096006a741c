//! Error types for tracekit.
//!
//! Enrichment failures never surface as failures of the operation being
//! traced; the only variants a caller must handle come out of init-time
//! setup. A missing tracing runtime is not an error at all; span sources
//! degrade to no-op spans silently.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The encoder cannot represent the given value (nested object,
    /// mixed-type array, null array element). Logged and dropped at the
    /// attach boundary, never fatal.
    #[error("unsupported attribute shape: {0}")]
    UnsupportedAttributeShape(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("telemetry init failed: {0}")]
    Telemetry(String),
}

pub type Result<T> = std::result::Result<T, Error>;
