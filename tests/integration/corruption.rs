//! Injected corruption is caught by the next operation.

use canary_stack::testing::{force_size, smash_leading_canary, smash_trailing_canary};
use canary_stack::{verify, CanaryStack, StackConfig, StackError};

use crate::common::{flip_payload_byte, stack_of, DEMO_VALUES};

#[test]
fn test_one_byte_past_payload_trips_trailing_data_guard() {
    let mut stk = stack_of(&DEMO_VALUES);
    let end = (stk.capacity() * 8) as isize;
    assert!(flip_payload_byte(&mut stk, end));

    let err = stk.verify().unwrap_err();
    assert!(matches!(err, StackError::TrailingDataGuard { .. }));
    assert_eq!(stk.push(1.0), Err(err.clone()));
    assert_eq!(stk.pop(), Err(err.clone()));
    assert_eq!(stk.peek(), Err(err));
}

#[test]
fn test_one_byte_before_payload_trips_leading_data_guard() {
    let mut stk = stack_of(&DEMO_VALUES);
    assert!(flip_payload_byte(&mut stk, -1));
    assert!(matches!(
        stk.verify(),
        Err(StackError::LeadingDataGuard { .. })
    ));
}

#[test]
fn test_smashed_container_guards() {
    let mut stk = stack_of(&DEMO_VALUES);
    smash_trailing_canary(&mut stk, 0);
    assert!(matches!(
        stk.peek(),
        Err(StackError::TrailingContainerGuard { found: 0, .. })
    ));

    let mut stk = stack_of(&DEMO_VALUES);
    smash_leading_canary(&mut stk, canary_stack::CONTAINER_GUARD_CONST);
    assert!(matches!(
        stk.pop(),
        Err(StackError::LeadingContainerGuard { .. })
    ));
}

#[test]
fn test_size_beyond_capacity_is_overflow() {
    let mut stk = stack_of(&DEMO_VALUES);
    force_size(&mut stk, 5);
    assert_eq!(
        stk.verify(),
        Err(StackError::Overflow {
            size: 5,
            capacity: 4
        })
    );
}

#[test]
fn test_payload_corruption_is_not_a_guard_failure() {
    let mut stk = stack_of(&DEMO_VALUES);
    assert!(flip_payload_byte(&mut stk, 0));
    assert_eq!(stk.verify(), Ok(()));
    assert_ne!(stk.values()[0], 8.5);
}

#[test]
fn test_null_container() {
    assert_eq!(
        verify::<canary_stack::SystemReallocator>(None),
        Err(StackError::NullContainer)
    );
}

#[test]
fn test_entry_only_still_checks_on_entry() {
    let mut stk = CanaryStack::with_config(StackConfig::entry_only());
    stk.initialize().unwrap();
    stk.push(1.0).unwrap();
    let end = (stk.capacity() * 8) as isize;
    assert!(flip_payload_byte(&mut stk, end));
    assert!(matches!(
        stk.push(2.0),
        Err(StackError::TrailingDataGuard { .. })
    ));
}
