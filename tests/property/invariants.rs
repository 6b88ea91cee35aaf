//! Invariants over arbitrary operation sequences.

use canary_stack::{CanaryStack, StackConfig, StackError};
use proptest::prelude::*;

use crate::common::{assert_well_formed, stack_of};

// ============================================================================
// STRATEGIES
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Push(f64),
    Pop,
    Peek,
}

/// Finite values only; NaN would defeat equality checks, not the stack.
fn value_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(-0.0),
        Just(f64::MAX),
        Just(f64::MIN_POSITIVE),
        -1.0e12..1.0e12f64,
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => value_strategy().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => Just(Op::Peek),
    ]
}

fn config_strategy() -> impl Strategy<Value = StackConfig> {
    prop_oneof![Just(StackConfig::strict()), Just(StackConfig::entry_only())]
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// The stack behaves like a `Vec` and stays well formed after every step.
    #[test]
    fn prop_matches_vec_model(
        ops in prop::collection::vec(op_strategy(), 0..200),
        config in config_strategy(),
    ) {
        let mut stk = CanaryStack::with_config(config);
        stk.initialize().unwrap();
        let mut model: Vec<f64> = Vec::new();

        for op in ops {
            match op {
                Op::Push(v) => {
                    prop_assert_eq!(stk.push(v), Ok(()));
                    model.push(v);
                }
                Op::Pop => match model.pop() {
                    Some(v) => prop_assert_eq!(stk.pop(), Ok(v)),
                    None => prop_assert_eq!(stk.pop(), Err(StackError::Underflow)),
                },
                Op::Peek => match model.last() {
                    Some(&v) => prop_assert_eq!(stk.peek(), Ok(v)),
                    None => prop_assert_eq!(stk.peek(), Err(StackError::Underflow)),
                },
            }
            prop_assert_eq!(stk.len(), model.len());
            prop_assert_eq!(stk.values(), model.clone());
            assert_well_formed(&stk);
        }
    }

    /// Push then pop hands back the same bits and restores the size.
    #[test]
    fn prop_push_pop_round_trip(
        prefix in prop::collection::vec(value_strategy(), 0..40),
        v in value_strategy(),
    ) {
        let mut stk = stack_of(&prefix);
        let size = stk.len();

        stk.push(v).unwrap();
        let back = stk.pop().unwrap();

        prop_assert_eq!(back.to_bits(), v.to_bits());
        prop_assert_eq!(stk.len(), size);
        prop_assert_eq!(stk.values(), prefix);
    }

    /// Peek changes nothing: not the size, not any slot, not the block.
    #[test]
    fn prop_peek_is_pure(values in prop::collection::vec(value_strategy(), 1..40)) {
        let stk = stack_of(&values);
        let bytes = stk.storage().to_bytes();
        let region = stk.region();

        for _ in 0..3 {
            prop_assert_eq!(stk.peek(), Ok(*values.last().unwrap()));
        }

        prop_assert_eq!(stk.len(), values.len());
        prop_assert_eq!(stk.region(), region);
        prop_assert_eq!(stk.storage().to_bytes(), bytes);
    }

    /// Popped slots read back as zero.
    #[test]
    fn prop_popped_slots_are_wiped(
        values in prop::collection::vec(1.0..1.0e6f64, 1..30),
        pops in 0usize..30,
    ) {
        let mut stk = stack_of(&values);
        let pops = pops.min(values.len());
        for _ in 0..pops {
            stk.pop().unwrap();
        }

        let live = stk.len();
        for slot in stk.storage().slots().skip(live) {
            prop_assert_eq!(slot, Some(0.0));
        }
    }
}
