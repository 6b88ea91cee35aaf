//! Error classification as seen by callers of the public operations.

use canary_stack::{CanaryStack, ErrorClass, StackError};

use crate::common::stack_of;

#[test]
fn test_lifecycle_errors() {
    let mut stack = CanaryStack::new();
    let err = stack.push(1.0).unwrap_err();
    assert_eq!(err, StackError::NotInitialized);
    assert_eq!(err.class(), ErrorClass::Lifecycle);

    stack.initialize().unwrap();
    let err = stack.initialize().unwrap_err();
    assert_eq!(err.code(), 1);
    assert_eq!(err.name(), "ALREADY_INITIALIZED");
}

#[test]
fn test_underflow_is_bounds_not_corruption() {
    let mut stack = stack_of(&[]);
    let err = stack.pop().unwrap_err();
    assert_eq!(err, StackError::Underflow);
    assert_eq!(err.class(), ErrorClass::Bounds);
    assert!(!err.is_corruption());
    assert_eq!(err.code(), 5);
}

#[test]
fn test_guard_errors_name_the_dead_guard() {
    let err = StackError::TrailingDataGuard {
        found: 0,
        expected: 0xdead,
    };
    assert_eq!(err.name(), "DEAD_TRAILING_DATA_GUARD");
    assert_eq!(err.code(), 13);
    assert!(err.is_corruption());
    assert!(err.to_string().contains("0x000000000000dead"));
}

#[test]
fn test_test_failure_is_its_own_class() {
    let err = StackError::TestFailed {
        target: "trailing data guard",
        budget: 8,
        last: "OK".to_string(),
    };
    assert_eq!(err.class(), ErrorClass::Test);
    assert!(!err.is_corruption());
    assert!(err.to_string().contains("trailing data guard"));
}

#[test]
fn test_errors_convert_into_anyhow() {
    fn run() -> anyhow::Result<f64> {
        let mut stack = stack_of(&[]);
        Ok(stack.peek()?)
    }
    let err = run().unwrap_err();
    assert_eq!(
        err.downcast_ref::<StackError>(),
        Some(&StackError::Underflow)
    );
}
