//! Exporter seam tests: the parent-child scenario, allow-list filtering,
//! and the OTel bridge smoke path.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracekit::export::otel::OtelExporter;
use tracekit::export::{FinishedSpan, InMemoryExporter, NoopExporter, SpanExporter};
use tracekit::{AttributeValue, SpanId, SpanSource, TraceId, attach, keys};

// ---------------------------------------------------------------------------
// Parent-child scenario
// ---------------------------------------------------------------------------

#[test]
fn nested_scopes_export_one_parent_child_pair() {
    let exporter = Arc::new(InMemoryExporter::new());
    let source = SpanSource::new("orders", "1.0.0", exporter.clone());

    let a = source.start_scoped("A");
    {
        let b = source.start_scoped("B");
        attach(&b, keys::OPERATION, "create");
        attach(&b, keys::RESOURCE_ID, 7i64);
    }
    drop(a);

    let finished = exporter.finished();
    assert_eq!(finished.len(), 2);

    let b = &finished[0];
    let a = &finished[1];
    assert_eq!(b.name, "B");
    assert_eq!(a.name, "A");

    // One causal pair in one trace.
    assert_eq!(b.trace_id, a.trace_id);
    assert_eq!(b.parent_span_id, Some(a.span_id));
    assert_eq!(a.parent_span_id, None);

    // B holds the two attributes, A holds none.
    assert_eq!(b.attributes.len(), 2);
    assert_eq!(
        b.attributes.get(keys::OPERATION),
        Some(&AttributeValue::String("create".to_string()))
    );
    assert_eq!(
        b.attributes.get(keys::RESOURCE_ID),
        Some(&AttributeValue::Int(7))
    );
    assert!(a.attributes.is_empty());

    // Source identity rides on every finished span.
    assert_eq!(a.source_name, "orders");
    assert_eq!(a.source_version, "1.0.0");
    assert!(a.duration() >= chrono::Duration::zero());
}

// ---------------------------------------------------------------------------
// Allow-list
// ---------------------------------------------------------------------------

fn sample_span(source_name: &str) -> FinishedSpan {
    let now = Utc::now();
    FinishedSpan {
        source_name: source_name.to_string(),
        source_version: "1.0.0".to_string(),
        trace_id: TraceId(1),
        span_id: SpanId(2),
        parent_span_id: None,
        name: "op".to_string(),
        start: now,
        end: now,
        attributes: HashMap::new(),
    }
}

#[test]
fn allowlist_selects_sources_for_export() {
    let provider = SdkTracerProvider::builder().build();
    let exporter = OtelExporter::new(provider, Some(vec!["allowed".to_string()]));

    assert!(exporter.allows("allowed"));
    assert!(!exporter.allows("other"));

    // Both paths must be silent; filtering never reaches the caller.
    exporter.export(sample_span("allowed"));
    exporter.export(sample_span("other"));
}

#[test]
fn no_allowlist_exports_every_source() {
    let provider = SdkTracerProvider::builder().build();
    let exporter = OtelExporter::new(provider, None);

    assert!(exporter.allows("anything"));
    exporter.export(sample_span("anything"));
}

// ---------------------------------------------------------------------------
// Degrade paths
// ---------------------------------------------------------------------------

#[test]
fn noop_exporter_swallows_spans() {
    let source = SpanSource::new("quiet", "1.0.0", Arc::new(NoopExporter));
    let span = source.start("op");
    attach(&span, keys::ENTITY, "product");

    // Spans are still real and enrichable; only delivery is absent.
    assert!(!span.is_noop());
    assert_eq!(
        span.attribute(keys::ENTITY),
        Some(AttributeValue::String("product".to_string()))
    );
    assert!(span.end());
}

#[test]
fn otel_bridge_maps_every_attribute_kind() {
    let provider = SdkTracerProvider::builder().build();
    let exporter = OtelExporter::new(provider, None);

    let mut span = sample_span("kinds");
    span.attributes
        .insert("b".to_string(), AttributeValue::Bool(true));
    span.attributes
        .insert("i".to_string(), AttributeValue::Int(1));
    span.attributes
        .insert("f".to_string(), AttributeValue::Float(0.5));
    span.attributes
        .insert("s".to_string(), AttributeValue::String("x".to_string()));
    span.attributes
        .insert("bs".to_string(), AttributeValue::BoolArray(vec![true]));
    span.attributes
        .insert("is".to_string(), AttributeValue::IntArray(vec![1, 2]));
    span.attributes
        .insert("fs".to_string(), AttributeValue::FloatArray(vec![0.5]));
    span.attributes.insert(
        "ss".to_string(),
        AttributeValue::StringArray(vec!["a".to_string()]),
    );
    span.parent_span_id = Some(SpanId(9));

    exporter.export(span);
}
