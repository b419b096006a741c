//! Encoding dispatch tests for the attribute value boundary.

use serde_json::json;
use tracekit::{AttributeValue, Error};

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

#[test]
fn scalars_encode_directly() {
    assert_eq!(
        AttributeValue::from_json(&json!(true)).unwrap(),
        Some(AttributeValue::Bool(true))
    );
    assert_eq!(
        AttributeValue::from_json(&json!(42)).unwrap(),
        Some(AttributeValue::Int(42))
    );
    assert_eq!(
        AttributeValue::from_json(&json!(-7)).unwrap(),
        Some(AttributeValue::Int(-7))
    );
    assert_eq!(
        AttributeValue::from_json(&json!(2.5)).unwrap(),
        Some(AttributeValue::Float(2.5))
    );
    assert_eq!(
        AttributeValue::from_json(&json!("widget")).unwrap(),
        Some(AttributeValue::String("widget".to_string()))
    );
}

#[test]
fn number_beyond_i64_becomes_float() {
    let value = AttributeValue::from_json(&json!(u64::MAX)).unwrap().unwrap();
    match value {
        AttributeValue::Float(f) => assert!(f > 0.0),
        other => panic!("expected Float, got {other:?}"),
    }
}

#[test]
fn null_encodes_as_absent() {
    assert_eq!(
        AttributeValue::from_json(&serde_json::Value::Null).unwrap(),
        None
    );
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[test]
fn homogeneous_arrays_preserve_order_and_count() {
    assert_eq!(
        AttributeValue::from_json(&json!([1, 2, 3])).unwrap(),
        Some(AttributeValue::IntArray(vec![1, 2, 3]))
    );
    assert_eq!(
        AttributeValue::from_json(&json!(["c", "a", "b"])).unwrap(),
        Some(AttributeValue::StringArray(vec![
            "c".to_string(),
            "a".to_string(),
            "b".to_string()
        ]))
    );
    assert_eq!(
        AttributeValue::from_json(&json!([true, false, true])).unwrap(),
        Some(AttributeValue::BoolArray(vec![true, false, true]))
    );
    assert_eq!(
        AttributeValue::from_json(&json!([1.5, 0.25])).unwrap(),
        Some(AttributeValue::FloatArray(vec![1.5, 0.25]))
    );
}

#[test]
fn empty_array_defaults_to_string_array() {
    assert_eq!(
        AttributeValue::from_json(&json!([])).unwrap(),
        Some(AttributeValue::StringArray(Vec::new()))
    );
}

#[test]
fn mixed_type_array_is_rejected() {
    let err = AttributeValue::from_json(&json!([1, "two"])).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAttributeShape(_)));
}

#[test]
fn int_and_float_mix_is_rejected_not_coerced() {
    let err = AttributeValue::from_json(&json!([1, 2.5])).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAttributeShape(_)));

    let err = AttributeValue::from_json(&json!([2.5, 1])).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAttributeShape(_)));
}

#[test]
fn null_array_element_is_rejected() {
    let err = AttributeValue::from_json(&json!(["a", null])).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAttributeShape(_)));
}

#[test]
fn nested_arrays_and_objects_are_rejected() {
    let err = AttributeValue::from_json(&json!([[1], [2]])).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAttributeShape(_)));

    let err = AttributeValue::from_json(&json!({"nested": true})).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAttributeShape(_)));
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

#[test]
fn from_impls_cover_natural_rust_types() {
    assert_eq!(AttributeValue::from(7i64), AttributeValue::Int(7));
    assert_eq!(AttributeValue::from(7i32), AttributeValue::Int(7));
    assert_eq!(AttributeValue::from("x"), AttributeValue::String("x".to_string()));
    assert_eq!(
        AttributeValue::from(vec!["a", "b"]),
        AttributeValue::StringArray(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(AttributeValue::from(true).kind(), "bool");
    assert_eq!(AttributeValue::from(vec![1i64]).kind(), "int[]");
}
