//! OpenTelemetry bridge.
//!
//! Replays finished spans into an [`SdkTracerProvider`], preserving ids,
//! timestamps, parentage, and attributes, under an instrumentation scope
//! named after the span's source. Delivery from there is the SDK batch
//! pipeline's concern.

use std::collections::HashSet;
use std::time::SystemTime;

use opentelemetry::trace::{
    Span as _, SpanContext, SpanId as OtelSpanId, TraceContextExt as _, TraceFlags,
    TraceId as OtelTraceId, TraceState, Tracer as _, TracerProvider as _,
};
use opentelemetry::{Array, Context, InstrumentationScope, KeyValue, StringValue, Value};
use opentelemetry_sdk::trace::SdkTracerProvider;

use super::{FinishedSpan, SpanExporter};
use crate::value::AttributeValue;

/// Exporter backed by an OpenTelemetry SDK tracer provider.
///
/// An allow-list, when present, selects which source names are exported.
/// Sources off the list behave identically up to this point: spans are
/// created and enriched as usual and silently dropped here.
pub struct OtelExporter {
    provider: SdkTracerProvider,
    allowlist: Option<HashSet<String>>,
}

impl OtelExporter {
    pub fn new(provider: SdkTracerProvider, allowlist: Option<Vec<String>>) -> Self {
        OtelExporter {
            provider,
            allowlist: allowlist.map(|list| list.into_iter().collect()),
        }
    }

    /// Whether spans from the named source will be exported.
    pub fn allows(&self, source_name: &str) -> bool {
        self.allowlist
            .as_ref()
            .is_none_or(|list| list.contains(source_name))
    }
}

impl SpanExporter for OtelExporter {
    fn export(&self, span: FinishedSpan) {
        if !self.allows(&span.source_name) {
            return;
        }

        let scope = InstrumentationScope::builder(span.source_name.clone())
            .with_version(span.source_version.clone())
            .build();
        let tracer = self.provider.tracer_with_scope(scope);

        let trace_id = OtelTraceId::from(span.trace_id.0);
        let attributes: Vec<KeyValue> = span
            .attributes
            .iter()
            .map(|(key, value)| KeyValue::new(key.clone(), to_otel_value(value)))
            .collect();

        let builder = tracer
            .span_builder(span.name)
            .with_trace_id(trace_id)
            .with_span_id(OtelSpanId::from(span.span_id.0))
            .with_start_time(SystemTime::from(span.start))
            .with_attributes(attributes);

        // Parentage rides in as a remote span context so the SDK links the
        // child without requiring the parent to still be live.
        let parent_cx = match span.parent_span_id {
            Some(parent_id) => Context::new().with_remote_span_context(SpanContext::new(
                trace_id,
                OtelSpanId::from(parent_id.0),
                TraceFlags::SAMPLED,
                false,
                TraceState::default(),
            )),
            None => Context::new(),
        };

        let mut otel_span = tracer.build_with_context(builder, &parent_cx);
        otel_span.end_with_timestamp(SystemTime::from(span.end));
    }
}

fn to_otel_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Int(i) => Value::I64(*i),
        AttributeValue::Float(f) => Value::F64(*f),
        AttributeValue::String(s) => Value::String(StringValue::from(s.clone())),
        AttributeValue::BoolArray(items) => Value::Array(Array::Bool(items.clone())),
        AttributeValue::IntArray(items) => Value::Array(Array::I64(items.clone())),
        AttributeValue::FloatArray(items) => Value::Array(Array::F64(items.clone())),
        AttributeValue::StringArray(items) => Value::Array(Array::String(
            items.iter().cloned().map(StringValue::from).collect(),
        )),
    }
}
