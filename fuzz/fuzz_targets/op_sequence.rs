// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for push/pop/peek sequences with allocation failures.
//!
//! The stack is checked against a plain `Vec` model after every operation.
//! When the allocator gives out, the stack must end up destroyed, never half
//! resized.

#![no_main]

use arbitrary::Arbitrary;
use canary_stack::testing::FailingReallocator;
use canary_stack::{CanaryStack, StackConfig, StackError, FLOOR_CAPACITY};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Push(f64),
    Pop,
    Peek,
    Verify,
}

/// Fuzz input: an allocation budget and the operations to run
#[derive(Debug, Arbitrary)]
struct OpInput {
    /// Successful reallocations before the allocator starts failing
    budget: u8,
    entry_only: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: OpInput| {
    let config = if input.entry_only {
        StackConfig::entry_only()
    } else {
        StackConfig::strict()
    };
    let alloc = FailingReallocator::after(input.budget as usize);
    let mut stk = CanaryStack::with_allocator(alloc).configured(config);

    if stk.initialize().is_err() {
        assert_eq!(input.budget, 0);
        assert!(!stk.is_initialized());
        return;
    }

    let mut model: Vec<u64> = Vec::new();

    // Cap operation count to avoid timeouts
    for op in input.ops.into_iter().take(2_000) {
        match op {
            Op::Push(v) => match stk.push(v) {
                Ok(()) => model.push(v.to_bits()),
                Err(StackError::AllocationFailed { .. }) => {
                    assert!(!stk.is_initialized());
                    assert!(stk.storage().is_null());
                    return;
                }
                Err(e) => panic!("push failed on a sound stack: {}", e),
            },
            Op::Pop => match stk.pop() {
                Ok(v) => assert_eq!(Some(v.to_bits()), model.pop()),
                Err(StackError::Underflow) => assert!(model.is_empty()),
                Err(StackError::ShrinkFailed { .. }) => {
                    assert!(!stk.is_initialized());
                    return;
                }
                Err(e) => panic!("pop failed on a sound stack: {}", e),
            },
            Op::Peek => match stk.peek() {
                Ok(v) => assert_eq!(Some(&v.to_bits()), model.last()),
                Err(StackError::Underflow) => assert!(model.is_empty()),
                Err(e) => panic!("peek failed on a sound stack: {}", e),
            },
            Op::Verify => assert_eq!(stk.verify(), Ok(())),
        }

        assert_eq!(stk.len(), model.len());
        assert!(stk.len() <= stk.capacity());
        assert!(stk.capacity() >= FLOOR_CAPACITY);
    }

    assert_eq!(stk.destroy(), Ok(()));
    assert_eq!(stk.destroy(), Ok(()));
});
