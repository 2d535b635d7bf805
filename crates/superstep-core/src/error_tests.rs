//! Tests for the error module.

use super::error::Error;

#[test]
fn test_error_codes_are_stable() {
    assert_eq!(Error::Configuration("x".into()).code(), "SUPERSTEP-001");
    assert_eq!(Error::out_of_range(10, 5).code(), "SUPERSTEP-002");
    assert_eq!(Error::UnknownField("rank".into()).code(), "SUPERSTEP-004");
    assert_eq!(Error::Cancelled { superstep: 3 }.code(), "SUPERSTEP-010");
}

#[test]
fn test_out_of_range_display() {
    let err = Error::out_of_range(42, 10);
    assert_eq!(
        err.to_string(),
        "[SUPERSTEP-002] Index 42 out of range for size 10"
    );
}

#[test]
fn test_computation_error_keeps_source() {
    let err = Error::Computation {
        superstep: 2,
        node_id: 7,
        source: anyhow::anyhow!("boom"),
    };
    let msg = err.to_string();
    assert!(msg.contains("superstep 2"));
    assert!(msg.contains("node 7"));
    assert!(msg.contains("boom"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_recoverable_errors() {
    assert!(Error::Cancelled { superstep: 0 }.is_recoverable());
    assert!(!Error::Capacity("too big".into()).is_recoverable());
    assert!(!Error::MemoryBudgetExceeded {
        required: 10,
        budget: 5
    }
    .is_recoverable());
}

#[test]
fn test_error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}
