//! Attribute attachment boundary and the CRUD attribute vocabulary.
//!
//! Attachment is idempotent per key (last write wins) and absorbing:
//! a value the encoder cannot represent is logged and dropped here, never
//! propagated to break the business operation being traced.

use crate::span::Span;
use crate::value::AttributeValue;

/// Attribute keys for CRUD-style resource operations.
///
/// The `business.*` prefix is the canonical convention for this crate;
/// multiple callers using these constants stay consistent across services.
pub mod keys {
    /// Operation kind, e.g. "create", "read", "update", "delete", "list".
    pub const OPERATION: &str = "business.operation";
    /// Logical entity name, e.g. "product".
    pub const ENTITY: &str = "business.entity";
    /// Identifier of the resource the operation touched.
    pub const RESOURCE_ID: &str = "business.resource.id";
    /// Outcome of the operation; see [`crate::encoder::outcome`].
    pub const OUTCOME: &str = "business.outcome";
    /// Short reason string when the outcome is an error.
    pub const ERROR_REASON: &str = "business.error.reason";
}

/// Values for [`keys::OUTCOME`].
pub mod outcome {
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
    /// Set automatically when an enclosing task is cancelled with the span
    /// still open.
    pub const CANCELLED: &str = "cancelled";
}

/// Attach a typed attribute to a span. Setting the same key twice
/// overwrites. No-op spans accept and ignore the call.
pub fn attach(span: &Span, key: &str, value: impl Into<AttributeValue>) {
    span.record(key, value);
}

/// Attach a dynamic JSON value.
///
/// `null` writes no key. Unsupported shapes (nested objects, mixed-type
/// arrays) are logged and dropped; the span's other attributes are left
/// untouched. Empty arrays encode as an empty string array, the
/// documented encoder default.
pub fn attach_json(span: &Span, key: &str, value: &serde_json::Value) {
    match AttributeValue::from_json(value) {
        Ok(Some(encoded)) => span.record(key, encoded),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(key, error = %err, "dropping attribute with unsupported shape");
        }
    }
}
