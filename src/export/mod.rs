//! Exporter seam.
//!
//! Closed spans leave the library as [`FinishedSpan`] snapshots through the
//! [`SpanExporter`] trait. The OpenTelemetry bridge lives in [`otel`];
//! [`InMemoryExporter`] backs tests and local inspection.

pub mod otel;

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::span::{SpanId, TraceId};
use crate::value::AttributeValue;

/// Immutable snapshot of a closed span.
#[derive(Debug, Clone)]
pub struct FinishedSpan {
    pub source_name: String,
    pub source_version: String,
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub parent_span_id: Option<SpanId>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attributes: HashMap<String, AttributeValue>,
}

impl FinishedSpan {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Receives every closed span from the sources wired to it.
///
/// Implementations must not block the caller; anything slow belongs on a
/// background pipeline (the OTel bridge hands off to a batch processor).
pub trait SpanExporter: Send + Sync {
    fn export(&self, span: FinishedSpan);
}

/// Discards everything. The degrade target when no runtime is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExporter;

impl SpanExporter for NoopExporter {
    fn export(&self, _span: FinishedSpan) {}
}

/// Collects finished spans in memory, in end order.
#[derive(Debug, Default)]
pub struct InMemoryExporter {
    spans: Mutex<Vec<FinishedSpan>>,
}

impl InMemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All spans exported so far, in the order they ended.
    pub fn finished(&self) -> Vec<FinishedSpan> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FinishedSpan>> {
        self.spans.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SpanExporter for InMemoryExporter {
    fn export(&self, span: FinishedSpan) {
        self.lock().push(span);
    }
}
