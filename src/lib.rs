//! # tracekit
//!
//! Request-scoped span enrichment: ambient span context, named span
//! sources, and typed attribute encoding, exported through a pluggable
//! exporter seam (OpenTelemetry OTLP included).
//!
//! A handler starts a scoped span from its source, enriches it, and lets
//! the scope close it on every exit path:
//!
//! ```rust,ignore
//! let guard = telemetry::init_telemetry(TelemetryConfig::from(&config))?;
//! let source = SpanSource::new("products-api", "1.0.0", guard.exporter());
//!
//! let scope = source.start_scoped("product.create");
//! encoder::attach(&scope, keys::OPERATION, "create");
//! encoder::attach(&scope, keys::ENTITY, "product");
//! encoder::attach(&scope, keys::RESOURCE_ID, product.id);
//! // ... business logic; the scope closes the span on return or unwind
//! ```

pub mod config;
pub mod context;
pub mod encoder;
pub mod error;
pub mod export;
pub mod source;
pub mod span;
pub mod telemetry;
pub mod value;

pub use context::{ContextGuard, SpanFutureExt, SpanScope, WithSpan, current};
pub use encoder::{attach, attach_json, keys, outcome};
pub use error::{Error, Result};
pub use source::SpanSource;
pub use span::{Span, SpanId, TraceId};
pub use value::AttributeValue;
