#![allow(clippy::float_cmp, clippy::cast_possible_wrap)]
//! Tests for the node value store and schema.

use std::sync::Arc;

use crate::error::Error;
use crate::schema::{PregelSchema, Value, ValueType, Visibility};
use crate::values::NodeValueStore;

fn schema() -> PregelSchema {
    PregelSchema::builder()
        .add("component", ValueType::Long)
        .add("rank", ValueType::Double)
        .add("path", ValueType::LongArray)
        .add_with_visibility("scratch", ValueType::DoubleArray, Visibility::Private)
        .build()
        .unwrap()
}

#[test]
fn test_unset_values_read_as_fallback() {
    let store = NodeValueStore::new(&schema(), 10, 2).unwrap();
    assert_eq!(store.get_long(9, "component").unwrap(), 0);
    assert!(store.get_double(9, "rank").unwrap().is_nan());
    assert!(store.get_long_array(9, "path").unwrap().is_empty());
    assert!(store.get_double_array(0, "scratch").unwrap().is_empty());
}

#[test]
fn test_custom_default_value() {
    let schema = PregelSchema::builder()
        .add_with_default("distance", Value::Double(f64::INFINITY))
        .build()
        .unwrap();
    let store = NodeValueStore::new(&schema, 5, 2).unwrap();
    assert_eq!(store.get_double(4, "distance").unwrap(), f64::INFINITY);
}

#[test]
fn test_set_and_get_each_type() {
    let store = NodeValueStore::new(&schema(), 10, 2).unwrap();
    store.set_long(3, "component", 42).unwrap();
    store.set_double(3, "rank", 0.25).unwrap();
    store.set_long_array(3, "path", vec![0, 1, 3]).unwrap();
    store.set_double_array(3, "scratch", vec![1.5]).unwrap();

    assert_eq!(store.get_long(3, "component").unwrap(), 42);
    assert_eq!(store.get_double(3, "rank").unwrap(), 0.25);
    assert_eq!(store.get_long_array(3, "path").unwrap().as_slice(), &[0, 1, 3]);
    assert_eq!(store.value(3, "scratch").unwrap(), Value::DoubleArray(vec![1.5]));
    assert_eq!(store.value(2, "component").unwrap(), Value::Long(0));
}

#[test]
fn test_type_mismatch() {
    let store = NodeValueStore::new(&schema(), 4, 2).unwrap();
    let err = store.get_double(0, "component").unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch { declared: "long", requested: "double", .. }
    ));
    assert!(store.set_long(0, "path", 1).is_err());
}

#[test]
fn test_unknown_field_and_out_of_range() {
    let store = NodeValueStore::new(&schema(), 4, 2).unwrap();
    assert!(matches!(
        store.get_long(0, "missing"),
        Err(Error::UnknownField(_))
    ));
    assert!(matches!(
        store.set_double(4, "rank", 1.0),
        Err(Error::OutOfRange { index: 4, size: 4 })
    ));
}

#[test]
fn test_declare_field_until_frozen() {
    let mut store = NodeValueStore::new(&PregelSchema::default(), 4, 2).unwrap();
    store.declare_field("seen", ValueType::Long).unwrap();
    assert!(matches!(
        store.declare_field("seen", ValueType::Double),
        Err(Error::DuplicateField(_))
    ));

    store.freeze();
    assert!(store.is_frozen());
    assert!(matches!(
        store.declare_field("late", ValueType::Double),
        Err(Error::SchemaFrozen(name)) if name == "late"
    ));
    assert_eq!(store.schema().len(), 1);
}

#[test]
fn test_duplicate_field_in_builder() {
    let result = PregelSchema::builder()
        .add("x", ValueType::Long)
        .add("x", ValueType::Double)
        .build();
    assert!(matches!(result, Err(Error::DuplicateField(_))));
}

#[test]
fn test_concurrent_writers_on_disjoint_nodes() {
    let store = Arc::new(NodeValueStore::new(&schema(), 1_000, 4).unwrap());
    std::thread::scope(|scope| {
        for worker in 0..4u64 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for node in (worker * 250)..((worker + 1) * 250) {
                    store.set_long(node, "component", node as i64).unwrap();
                }
            });
        }
    });
    let values = store.long_values("component").unwrap();
    assert!(values.iter().enumerate().all(|(i, v)| *v == i as i64));
}

#[test]
fn test_memory_estimation_sums_columns() {
    let schema = PregelSchema::builder()
        .add("a", ValueType::Long)
        .add("b", ValueType::Double)
        .build()
        .unwrap();
    // 10_000 eight-byte slots over 3 pages, twice
    let range = NodeValueStore::memory_estimation(&schema, 10_000, 0, 12).unwrap();
    assert_eq!(range.min(), 2 * (80_000 + 3 * 16));
    assert_eq!(range.min(), range.max());
}

#[test]
fn test_memory_estimation_bounds_published_arrays() {
    let schema = PregelSchema::builder()
        .add("seen", ValueType::LongArray)
        .add("weights", ValueType::DoubleArray)
        .build()
        .unwrap();
    let empty = NodeValueStore::memory_estimation(&schema, 1_000, 0, 12).unwrap();
    let sized = NodeValueStore::memory_estimation(&schema, 1_000, 16, 12).unwrap();

    // the slot tables do not depend on the array length
    assert_eq!(empty.min(), sized.min());
    // reference counts and vector header per node and field, then elements
    assert_eq!(empty.max() - empty.min(), 2 * 1_000 * 40);
    assert_eq!(sized.max() - sized.min(), 2 * 1_000 * (40 + 16 * 8));
    assert_eq!(crate::values::published_array_bytes::<i64>(16), 40 + 128);
}
