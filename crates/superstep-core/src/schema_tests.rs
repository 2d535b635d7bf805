//! Tests for node value schemas.

use super::error::Error;
use super::schema::{PregelSchema, Value, ValueType, Visibility};

#[test]
fn test_builder_keeps_declaration_order() {
    let schema = PregelSchema::builder()
        .add("zeta", ValueType::Long)
        .add("alpha", ValueType::DoubleArray)
        .add_with_visibility("mid", ValueType::Double, Visibility::Private)
        .build()
        .unwrap();
    let keys: Vec<&str> = schema.elements().map(|e| e.key()).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(schema.element("mid").unwrap().visibility(), Visibility::Private);
    assert!(schema.element("missing").is_none());
}

#[test]
fn test_fallback_defaults() {
    assert_eq!(ValueType::Long.fallback(), Value::Long(0));
    assert!(matches!(ValueType::Double.fallback(), Value::Double(v) if v.is_nan()));
    assert_eq!(ValueType::LongArray.fallback(), Value::LongArray(Vec::new()));
    assert_eq!(ValueType::DoubleArray.fallback(), Value::DoubleArray(Vec::new()));
}

#[test]
fn test_custom_default_sets_type() {
    let schema = PregelSchema::builder()
        .add_with_default("weights", Value::DoubleArray(vec![1.0, 2.0]))
        .build()
        .unwrap();
    let element = schema.element("weights").unwrap();
    assert_eq!(element.value_type(), ValueType::DoubleArray);
    assert_eq!(element.default_value(), &Value::DoubleArray(vec![1.0, 2.0]));
    assert_eq!(element.visibility(), Visibility::Public);
}

#[test]
fn test_duplicate_field_rejected() {
    let err = PregelSchema::builder()
        .add("x", ValueType::Long)
        .add("x", ValueType::Double)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateField(ref key) if key == "x"));
}

#[test]
fn test_blank_field_name_rejected() {
    let err = PregelSchema::builder().add("  ", ValueType::Long).build().unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_empty_schema() {
    let schema = PregelSchema::builder().build().unwrap();
    assert!(schema.is_empty());
    assert_eq!(schema.len(), 0);
}

#[test]
fn test_value_serializes_untagged() {
    assert_eq!(serde_json::to_value(Value::Long(3)).unwrap(), serde_json::json!(3));
    assert_eq!(
        serde_json::to_value(Value::DoubleArray(vec![0.5])).unwrap(),
        serde_json::json!([0.5])
    );
    assert_eq!(ValueType::LongArray.to_string(), ValueType::LongArray.name());
}
