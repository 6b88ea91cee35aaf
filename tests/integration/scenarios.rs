//! Lifecycle scenarios from initialize to destroy.

use canary_stack::{CanaryStack, DemoScenario, StackConfig, StackError, FLOOR_CAPACITY};

use crate::common::{assert_destroyed, assert_well_formed, stack_of, DEMO_VALUES, GROWTH_SCENARIO};

// ============================================================================
// CLASSIC DEMO
// ============================================================================

#[test]
fn test_push_peek_pop_underflow_destroy() {
    let mut stk = CanaryStack::new();
    stk.initialize().unwrap();

    stk.push(8.5).unwrap();
    stk.push(9.5).unwrap();
    assert_eq!(stk.peek(), Ok(9.5));
    assert_eq!(stk.len(), 2);

    assert_eq!(stk.pop(), Ok(9.5));
    assert_eq!(stk.len(), 1);
    assert_eq!(stk.pop(), Ok(8.5));
    assert_eq!(stk.len(), 0);

    assert_eq!(stk.pop(), Err(StackError::Underflow));
    assert_well_formed(&stk);

    assert_eq!(stk.destroy(), Ok(()));
    assert_destroyed(&stk);
}

#[test]
fn test_underflow_on_fresh_stack_keeps_it_usable() {
    let mut stk = stack_of(&[]);
    assert_eq!(stk.pop(), Err(StackError::Underflow));
    assert_eq!(stk.peek(), Err(StackError::Underflow));
    assert!(stk.is_initialized());
    assert_well_formed(&stk);

    stk.push(1.0).unwrap();
    assert_eq!(stk.pop(), Ok(1.0));
}

#[test]
fn test_destroy_is_idempotent() {
    let mut stk = stack_of(&DEMO_VALUES);
    assert_eq!(stk.destroy(), Ok(()));
    assert_eq!(stk.destroy(), Ok(()));
    assert!(!stk.is_initialized());
    assert_destroyed(&stk);

    let mut never = CanaryStack::new();
    assert_eq!(never.destroy(), Ok(()));
}

#[test]
fn test_operations_after_destroy_report_not_initialized() {
    let mut stk = stack_of(&DEMO_VALUES);
    stk.destroy().unwrap();
    assert_eq!(stk.push(1.0), Err(StackError::NotInitialized));
    assert_eq!(stk.pop(), Err(StackError::NotInitialized));
    assert_eq!(stk.peek(), Err(StackError::NotInitialized));
}

// ============================================================================
// GROWTH AND SHRINK
// ============================================================================

#[test]
fn test_five_pushes_double_then_shrink_back() {
    let mut stk = stack_of(&[]);
    assert_eq!(stk.capacity(), FLOOR_CAPACITY);

    for v in 1..=5 {
        stk.push(v as f64).unwrap();
    }
    assert_eq!(stk.capacity(), 8);
    assert_well_formed(&stk);

    let mut capacities = Vec::new();
    for v in (1..=5).rev() {
        assert_eq!(stk.pop(), Ok(v as f64));
        capacities.push((stk.len(), stk.capacity()));
        assert_well_formed(&stk);
    }
    assert_eq!(
        capacities,
        vec![(4, 8), (3, 8), (2, 4), (1, 4), (0, 4)]
    );
}

#[test]
fn test_growth_changes_the_data_guard() {
    let mut stk = stack_of(&[1.0, 2.0, 3.0, 4.0]);
    let region = stk.region();
    let guard = stk.storage().expected_guard();

    stk.push(5.0).unwrap();

    assert_ne!(stk.region(), region);
    assert_ne!(stk.storage().expected_guard(), guard);
    assert_eq!(stk.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_growth_scenario_file_runs_in_entry_only_mode() {
    let scenario = DemoScenario::from_json(GROWTH_SCENARIO).unwrap();
    let mut stk = CanaryStack::with_config(scenario.stack);
    assert_eq!(stk.config(), StackConfig::entry_only());
    stk.initialize().unwrap();

    for &v in &scenario.pushes {
        stk.push(v).unwrap();
    }
    assert_eq!(stk.capacity(), 16);

    for _ in 0..scenario.pops {
        stk.pop().unwrap();
    }
    assert!(stk.is_empty());
    assert_eq!(stk.capacity(), FLOOR_CAPACITY);
    assert_well_formed(&stk);
}
