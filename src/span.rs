//! Span model and lifecycle.
//!
//! A [`Span`] is a cheap clonable handle to a timed unit of traced work.
//! Identity is opaque and assigned at creation; attributes may be attached
//! any time before closure; closure happens exactly once and hands an
//! immutable snapshot to the exporter.
//!
//! Close-order policy: an explicit [`Span::end`] on a span that still has
//! open child spans is defensively rejected (logged, span stays open).
//! Scope teardown (guard drop, future cancellation) force-closes instead,
//! so mis-nested code leaks telemetry fidelity, never spans.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::export::{FinishedSpan, SpanExporter};
use crate::source::SourceInfo;
use crate::value::AttributeValue;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque 128-bit trace identifier shared by every span in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(pub u128);

/// Opaque 64-bit span identifier, unique within a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub u64);

impl TraceId {
    pub(crate) fn generate() -> Self {
        loop {
            let id = Uuid::new_v4().as_u128();
            if id != 0 {
                return TraceId(id);
            }
        }
    }
}

impl SpanId {
    pub(crate) fn generate() -> Self {
        loop {
            let id = Uuid::new_v4().as_u128() as u64;
            if id != 0 {
                return SpanId(id);
            }
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// Handle to a span. Clones share the same underlying span.
///
/// A handle with no backing state is a *no-op span*: every operation on it
/// is accepted and ignored. Span sources return no-op spans when the
/// tracing runtime is disabled so callers never branch on availability.
#[derive(Clone)]
pub struct Span {
    inner: Option<Arc<Mutex<SpanInner>>>,
}

pub(crate) struct SpanInner {
    source: Arc<SourceInfo>,
    name: String,
    trace_id: TraceId,
    span_id: SpanId,
    parent_span_id: Option<SpanId>,
    /// Handle kept for open-child accounting; released on end.
    parent: Option<Span>,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    attributes: HashMap<String, AttributeValue>,
    open_children: usize,
    exporter: Arc<dyn SpanExporter>,
}

fn lock(inner: &Mutex<SpanInner>) -> MutexGuard<'_, SpanInner> {
    // A panic while holding the lock poisons it; the data is still sound
    // for our single-writer operations, so recover rather than unwind again
    // inside a guard's drop.
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Span {
    /// A span that records nothing and exports nothing.
    pub fn noop() -> Self {
        Span { inner: None }
    }

    pub(crate) fn start(
        source: Arc<SourceInfo>,
        exporter: Arc<dyn SpanExporter>,
        name: impl Into<String>,
        parent: Option<&Span>,
    ) -> Self {
        // A no-op parent has no identity to nest under; the child starts a
        // fresh root trace instead.
        let parent = parent.filter(|p| !p.is_noop());

        let (trace_id, parent_span_id) = match parent {
            Some(p) => {
                p.child_started();
                // Recording parents always expose ids.
                (
                    p.trace_id().unwrap_or_else(TraceId::generate),
                    p.span_id(),
                )
            }
            None => (TraceId::generate(), None),
        };

        Span {
            inner: Some(Arc::new(Mutex::new(SpanInner {
                source,
                name: name.into(),
                trace_id,
                span_id: SpanId::generate(),
                parent_span_id,
                parent: parent.cloned(),
                start: Utc::now(),
                end: None,
                attributes: HashMap::new(),
                open_children: 0,
                exporter,
            }))),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.inner.is_none()
    }

    /// Whether this handle and `other` refer to the same span. Any two
    /// no-op handles compare equal.
    pub fn same(&self, other: &Span) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> Option<String> {
        self.inner.as_ref().map(|i| lock(i).name.clone())
    }

    pub fn trace_id(&self) -> Option<TraceId> {
        self.inner.as_ref().map(|i| lock(i).trace_id)
    }

    pub fn span_id(&self) -> Option<SpanId> {
        self.inner.as_ref().map(|i| lock(i).span_id)
    }

    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.inner.as_ref().and_then(|i| lock(i).parent_span_id)
    }

    pub fn is_ended(&self) -> bool {
        match &self.inner {
            Some(i) => lock(i).end.is_some(),
            None => true,
        }
    }

    /// Attach an attribute. Last write per key wins. Attaching to an
    /// already-ended span is logged and ignored.
    pub fn record(&self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let Some(inner) = &self.inner else { return };
        let mut guard = lock(inner);
        if guard.end.is_some() {
            tracing::warn!(span = %guard.name, "attribute attached after span end; dropped");
            return;
        }
        guard.attributes.insert(key.into(), value.into());
    }

    /// Read back an attribute. `None` for unset keys and no-op spans.
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        let inner = self.inner.as_ref()?;
        lock(inner).attributes.get(key).cloned()
    }

    /// Close the span and hand it to the exporter.
    ///
    /// Returns `false` without closing when the span has already ended or
    /// still has open child spans (the defensive close-order policy).
    /// No-op spans report `true`.
    pub fn end(&self) -> bool {
        self.finish(true)
    }

    /// Close regardless of open children. Used by scope teardown, where
    /// leaving the span open would leak it.
    pub(crate) fn end_forced(&self) {
        self.finish(false);
    }

    fn finish(&self, checked: bool) -> bool {
        let Some(inner) = &self.inner else { return true };

        let (snapshot, parent, exporter) = {
            let mut guard = lock(inner);
            if guard.end.is_some() {
                tracing::warn!(span = %guard.name, "span already ended; ignoring end");
                return false;
            }
            if checked && guard.open_children > 0 {
                tracing::warn!(
                    span = %guard.name,
                    open_children = guard.open_children,
                    "refusing to end span with open child spans"
                );
                return false;
            }
            let end = Utc::now();
            guard.end = Some(end);
            (guard.snapshot(end), guard.parent.take(), guard.exporter.clone())
        };

        if let Some(parent) = parent {
            parent.child_ended();
        }
        exporter.export(snapshot);
        true
    }

    fn child_started(&self) {
        if let Some(inner) = &self.inner {
            lock(inner).open_children += 1;
        }
    }

    fn child_ended(&self) {
        if let Some(inner) = &self.inner {
            let mut guard = lock(inner);
            guard.open_children = guard.open_children.saturating_sub(1);
        }
    }
}

impl SpanInner {
    fn snapshot(&self, end: DateTime<Utc>) -> FinishedSpan {
        FinishedSpan {
            source_name: self.source.name.clone(),
            source_version: self.source.version.clone(),
            trace_id: self.trace_id,
            span_id: self.span_id,
            parent_span_id: self.parent_span_id,
            name: self.name.clone(),
            start: self.start,
            end,
            attributes: self.attributes.clone(),
        }
    }
}

impl Drop for SpanInner {
    fn drop(&mut self) {
        // Last handle gone without an end call: the span is lost, not
        // exported. Guard-based scoping makes this unreachable in practice.
        if self.end.is_none() {
            tracing::warn!(span = %self.name, "span dropped without being ended; not exported");
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => {
                let guard = lock(inner);
                f.debug_struct("Span")
                    .field("name", &guard.name)
                    .field("trace_id", &guard.trace_id.to_string())
                    .field("span_id", &guard.span_id.to_string())
                    .field("ended", &guard.end.is_some())
                    .finish()
            }
            None => f.debug_struct("Span").field("noop", &true).finish(),
        }
    }
}
