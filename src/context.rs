//! Ambient span context.
//!
//! The "current span" is task-local: a thread-local stack of active spans,
//! entered and exited through guards, with [`WithSpan`] re-entering the
//! context around every poll so async tasks keep their span across await
//! points and worker-thread migration. There is deliberately no
//! process-wide mutable current-span variable; concurrent tasks never
//! observe each other's context.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::ops::Deref;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use crate::encoder::{keys, outcome};
use crate::span::Span;

thread_local! {
    static ACTIVE: RefCell<Vec<Span>> = const { RefCell::new(Vec::new()) };
}

/// The innermost active span for the calling logical task, if any.
///
/// Absence is a normal outcome (background work outside any trace), not an
/// error. Pure read; never panics.
pub fn current() -> Option<Span> {
    ACTIVE.with(|stack| stack.borrow().last().cloned())
}

fn push(span: &Span) {
    ACTIVE.with(|stack| stack.borrow_mut().push(span.clone()));
}

fn pop(span: &Span) {
    ACTIVE.with(|stack| {
        let mut stack = stack.borrow_mut();
        match stack.pop() {
            Some(top) if top.same(span) => {}
            Some(top) => {
                // Guards dropped out of order. Put the stranger back and
                // remove our entry wherever it sits.
                tracing::warn!("span context exited out of order");
                stack.push(top);
                if let Some(pos) = stack.iter().rposition(|s| s.same(span)) {
                    stack.remove(pos);
                }
            }
            None => {
                tracing::warn!("span context exited with empty context stack");
            }
        }
    });
}

impl Span {
    /// Make this span the current context until the guard drops.
    ///
    /// Context-only: the span is not closed when the guard drops. Prefer
    /// [`crate::SpanSource::start_scoped`] where the span's lifetime matches
    /// the scope.
    pub fn enter(&self) -> ContextGuard {
        push(self);
        ContextGuard {
            span: self.clone(),
            _not_send: PhantomData,
        }
    }
}

/// Restores the previous context on drop. `!Send`; entry and exit happen
/// on one thread.
#[must_use = "dropping the guard immediately exits the span context"]
pub struct ContextGuard {
    span: Span,
    _not_send: PhantomData<*mut ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        pop(&self.span);
    }
}

/// Owning scope: the span is current until the scope drops, and the drop
/// closes it, on normal return, early return, and panic unwind alike.
///
/// A panic unwind marks `business.outcome = "error"` before closing.
#[must_use = "dropping the scope immediately closes the span"]
pub struct SpanScope {
    span: Span,
    _not_send: PhantomData<*mut ()>,
}

impl SpanScope {
    pub(crate) fn enter(span: Span) -> Self {
        push(&span);
        SpanScope {
            span,
            _not_send: PhantomData,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Deref for SpanScope {
    type Target = Span;

    fn deref(&self) -> &Span {
        &self.span
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        pop(&self.span);
        if !self.span.is_ended() {
            if std::thread::panicking() {
                self.span.record(keys::OUTCOME, outcome::ERROR);
            }
            self.span.end_forced();
        }
    }
}

/// Future combinator that owns a span's lifecycle.
///
/// The span is entered around every poll. When the future completes the
/// span is closed as-is; when the future is dropped before completion
/// (task cancellation) the span is closed with
/// `business.outcome = "cancelled"` rather than left dangling.
pub struct WithSpan<F> {
    future: F,
    span: Span,
    completed: bool,
}

/// Attach a span to a future; see [`WithSpan`].
pub trait SpanFutureExt: Future + Sized {
    fn in_span(self, span: Span) -> WithSpan<Self> {
        WithSpan {
            future: self,
            span,
            completed: false,
        }
    }
}

impl<F: Future> SpanFutureExt for F {}

impl<F: Future> Future for WithSpan<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<F::Output> {
        // SAFETY: the inner future is never moved out of `self`; only a
        // pinned reference to it is produced. The remaining fields are
        // plain data.
        let this = unsafe { self.get_unchecked_mut() };
        let _guard = this.span.enter();
        let poll = unsafe { Pin::new_unchecked(&mut this.future) }.poll(cx);
        if poll.is_ready() {
            this.completed = true;
        }
        poll
    }
}

impl<F> Drop for WithSpan<F> {
    fn drop(&mut self) {
        if self.span.is_ended() {
            return;
        }
        if !self.completed {
            self.span.record(keys::OUTCOME, outcome::CANCELLED);
        }
        // Force-close: under cancellation this drop runs before the inner
        // future's own state (and any child scopes in it) is torn down.
        self.span.end_forced();
    }
}
