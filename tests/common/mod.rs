//! Shared test utilities and fixtures.

#![allow(dead_code)]

use canary_stack::{CanaryStack, Reallocator, FLOOR_CAPACITY, GUARD_WIDTH};

// Re-export canonical test utilities from canary_stack::testing
pub use canary_stack::testing::{poke_payload_byte, stack_of, FailingReallocator};

// ============================================================================
// FIXTURES
// ============================================================================

/// The values pushed by the classic demo.
pub const DEMO_VALUES: [f64; 2] = [8.5, 9.5];

/// Scenario JSON that pushes enough to force two growths.
pub const GROWTH_SCENARIO: &str = r#"{
  "pushes": [1, 2, 3, 4, 5, 6, 7, 8, 9],
  "pops": 9,
  "peek": true,
  "stack": { "verifyMode": "entry-only" }
}"#;

/// Initialized stack backed by an allocator that fails after `successes`
/// calls.
pub fn failing_stack(successes: usize) -> (CanaryStack<FailingReallocator>, FailingReallocator) {
    let alloc = FailingReallocator::after(successes);
    let mut stack = CanaryStack::with_allocator(alloc.clone());
    stack
        .initialize()
        .expect("initialize within the allocator's budget");
    (stack, alloc)
}

/// Invert one byte of the backing block, addressed from the payload start
/// like `poke_payload_byte`. The new value always differs from the old.
pub fn flip_payload_byte<R: Reallocator>(stack: &mut CanaryStack<R>, offset: isize) -> bool {
    let Some(payload) = stack.storage().payload_offset() else {
        return false;
    };
    let absolute = payload as isize * GUARD_WIDTH as isize + offset;
    let bytes = stack.storage().to_bytes();
    let old = match usize::try_from(absolute).ok().and_then(|at| bytes.get(at)) {
        Some(&b) => b,
        None => return false,
    };
    poke_payload_byte(stack, offset, !old)
}

// ============================================================================
// WELL-FORMEDNESS
// ============================================================================

/// Assert every structural invariant an initialized stack must hold.
pub fn assert_well_formed<R: Reallocator>(stack: &CanaryStack<R>) {
    assert!(stack.is_initialized(), "stack not initialized");
    assert_eq!(stack.verify(), Ok(()));

    let storage = stack.storage();
    assert!(stack.len() <= stack.capacity(), "size exceeds capacity");
    assert!(stack.capacity() >= FLOOR_CAPACITY, "capacity below floor");
    assert_eq!(storage.capacity(), stack.capacity());

    let expected = storage.expected_guard();
    assert_eq!(storage.leading_guard(), Some(expected));
    assert_eq!(storage.trailing_guard(), Some(expected));

    let container = stack.expected_container_guard();
    assert_eq!(stack.leading_canary(), container);
    assert_eq!(stack.trailing_canary(), container);

    for (i, slot) in storage.slots().enumerate().skip(stack.len()) {
        assert_eq!(slot, Some(0.0), "unused slot {} not zero", i);
    }
}

/// Assert the stack is back in its zeroed, uninitialized state.
pub fn assert_destroyed<R: Reallocator>(stack: &CanaryStack<R>) {
    assert!(!stack.is_initialized());
    assert_eq!(stack.len(), 0);
    assert_eq!(stack.capacity(), 0);
    assert!(stack.storage().is_null());
    assert_eq!(stack.leading_canary(), 0);
    assert_eq!(stack.trailing_canary(), 0);
    assert!(stack.instance().is_none());
}
