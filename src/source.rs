//! Named span sources.
//!
//! A [`SpanSource`] is the factory a component registers under a logical
//! name and version. It is an explicitly constructed, dependency-injected
//! value (one per process by convention, never a hidden global), so tests
//! can swap in an [`crate::export::InMemoryExporter`].

use std::sync::Arc;

use crate::context::{self, SpanScope};
use crate::export::{NoopExporter, SpanExporter};
use crate::span::Span;

/// Registration key of a source: name + version ride on every finished
/// span and become the instrumentation scope at export time.
pub(crate) struct SourceInfo {
    pub name: String,
    pub version: String,
}

/// Factory for spans under one logical component name.
#[derive(Clone)]
pub struct SpanSource {
    info: Arc<SourceInfo>,
    exporter: Arc<dyn SpanExporter>,
    enabled: bool,
}

impl SpanSource {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        exporter: Arc<dyn SpanExporter>,
    ) -> Self {
        SpanSource {
            info: Arc::new(SourceInfo {
                name: name.into(),
                version: version.into(),
            }),
            exporter,
            enabled: true,
        }
    }

    /// A source for an absent tracing runtime: issues valid no-op spans so
    /// callers can attach attributes unconditionally. Silent degrade, not
    /// an error.
    pub fn disabled(name: impl Into<String>, version: impl Into<String>) -> Self {
        SpanSource {
            info: Arc::new(SourceInfo {
                name: name.into(),
                version: version.into(),
            }),
            exporter: Arc::new(NoopExporter),
            enabled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Start a span nested under the ambient current span, or a new root
    /// trace when nothing is active. Never fails, never returns null; on a
    /// disabled source the result is a no-op span.
    pub fn start(&self, name: impl Into<String>) -> Span {
        let parent = context::current();
        self.start_with_parent(name, parent.as_ref())
    }

    /// Start a span under an explicit parent instead of the ambient
    /// context. `None` starts a new root trace.
    pub fn start_with_parent(&self, name: impl Into<String>, parent: Option<&Span>) -> Span {
        if !self.enabled {
            return Span::noop();
        }
        Span::start(self.info.clone(), self.exporter.clone(), name, parent)
    }

    /// Start a span and make it current; the returned scope closes it on
    /// every exit path. This is the preferred entry point for handlers.
    pub fn start_scoped(&self, name: impl Into<String>) -> SpanScope {
        SpanScope::enter(self.start(name))
    }
}
