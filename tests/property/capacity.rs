//! Growth and shrink laws.

use canary_stack::policy::capacity_for;
use canary_stack::FLOOR_CAPACITY;
use proptest::prelude::*;

use crate::common::{assert_well_formed, stack_of};

proptest! {
    /// After `n` pushes the capacity is the smallest doubling of the floor
    /// that holds `n`.
    #[test]
    fn prop_growth_law(n in 0usize..300) {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let stk = stack_of(&values);

        prop_assert_eq!(stk.capacity(), capacity_for(n));
        prop_assert!(stk.capacity() >= FLOOR_CAPACITY);
        prop_assert!(stk.capacity() / 2 < n.max(1) || stk.capacity() == FLOOR_CAPACITY);
    }

    /// Popping to the watermark shrinks to `max(size, floor)` and the stack
    /// still verifies.
    #[test]
    fn prop_shrink_law(n in 5usize..300) {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let mut stk = stack_of(&values);

        while !stk.is_empty() {
            let capacity = stk.capacity();
            stk.pop().unwrap();
            let size = stk.len();

            let shrank = size <= capacity / 4 && size.max(FLOOR_CAPACITY) < capacity;
            if shrank {
                prop_assert_eq!(stk.capacity(), size.max(FLOOR_CAPACITY));
            } else {
                prop_assert_eq!(stk.capacity(), capacity);
            }
            prop_assert_eq!(stk.verify(), Ok(()));
        }
        assert_well_formed(&stk);
    }
}
