//! Allocation failures roll the stack back to the destroyed state.

use canary_stack::{CanaryStack, StackError};

use crate::common::{assert_destroyed, assert_well_formed, failing_stack, FailingReallocator};

#[test]
fn test_initial_allocation_failure() {
    let mut stk = CanaryStack::with_allocator(FailingReallocator::after(0));
    assert_eq!(
        stk.initialize(),
        Err(StackError::AllocationFailed { requested: 4 })
    );
    assert_destroyed(&stk);
    assert_eq!(stk.destroy(), Ok(()));
}

#[test]
fn test_growth_failure_destroys_stack() {
    let (mut stk, alloc) = failing_stack(1);
    for v in 0..4 {
        stk.push(v as f64).unwrap();
    }
    assert_eq!(alloc.calls(), 1);

    let err = stk.push(4.0).unwrap_err();
    assert!(matches!(err, StackError::AllocationFailed { .. }));
    assert_eq!(alloc.calls(), 2);
    assert_destroyed(&stk);

    assert_eq!(stk.pop(), Err(StackError::NotInitialized));
    assert_eq!(stk.destroy(), Ok(()));
}

#[test]
fn test_shrink_failure_destroys_stack() {
    let (mut stk, _alloc) = failing_stack(2);
    for v in 0..5 {
        stk.push(v as f64).unwrap();
    }
    assert_eq!(stk.capacity(), 8);

    assert_eq!(stk.pop(), Ok(4.0));
    assert_eq!(stk.pop(), Ok(3.0));
    assert_eq!(stk.pop(), Err(StackError::ShrinkFailed { requested: 4 }));
    assert_destroyed(&stk);
}

#[test]
fn test_no_allocation_without_growth_or_shrink() {
    let (mut stk, alloc) = failing_stack(1);
    for _ in 0..100 {
        stk.push(1.0).unwrap();
        stk.pop().unwrap();
    }
    assert_eq!(alloc.calls(), 1);
    assert_well_formed(&stk);
}

#[test]
fn test_reinitialize_after_rollback() {
    let alloc = FailingReallocator::after(1);
    let mut stk = CanaryStack::with_allocator(alloc);
    stk.initialize().unwrap();
    for v in 0..4 {
        stk.push(v as f64).unwrap();
    }
    assert!(stk.push(4.0).is_err());

    // Allocator is exhausted: re-initializing fails cleanly too.
    assert_eq!(
        stk.initialize(),
        Err(StackError::AllocationFailed { requested: 4 })
    );
    assert_destroyed(&stk);
}
